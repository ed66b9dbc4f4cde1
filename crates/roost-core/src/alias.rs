//! Alias generation — textual variants of a property name.
//!
//! Property names appear in free text under abbreviations ("SQ5" for
//! "Square On 5th"), phonetic misspellings, digit/number-word swaps, and
//! neighbourhood shorthand. The generator runs six independent passes, each
//! tagged with a fixed confidence weight, and unions the results into an
//! [`AliasSet`]. When two passes produce the same alias the higher weight
//! wins, so a late low-confidence pass never downgrades an earlier score.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

// ─── Pass weights ────────────────────────────────────────────────────────────

const W_BASIC: f64 = 0.9;
const W_ABBREVIATION: f64 = 0.8;
const W_SHORT_FORM: f64 = 0.7;
const W_PHONETIC: f64 = 0.6;
const W_NUMBER: f64 = 0.85;
const W_LOCATION: f64 = 0.75;

// ─── Word tables ─────────────────────────────────────────────────────────────

/// Filler words in housing names that carry no search signal.
const DEFAULT_STOP_WORDS: &[&str] = &[
  "apartment", "apartments", "apt", "apts", "student", "housing",
  "residences", "residence", "complex", "community", "towers", "tower",
  "lofts", "loft", "place", "plaza", "point", "pointe", "square", "station",
  "flats", "the", "at", "on", "of", "hall", "halls", "house", "houses",
  "village", "commons", "center", "centre", "park", "gardens", "court",
  "courts",
];

/// Verbatim word → abbreviation substitutions.
const DEFAULT_ABBREVIATIONS: &[(&str, &[&str])] = &[
  ("apartment", &["apt"]),
  ("apartments", &["apts"]),
  ("avenue", &["ave"]),
  ("boulevard", &["blvd"]),
  ("building", &["bldg"]),
  ("buildings", &["bldgs"]),
  ("campus", &["camp"]),
  ("circle", &["cir"]),
  ("college", &["coll"]),
  ("court", &["ct"]),
  ("drive", &["dr"]),
  ("place", &["pl"]),
  ("plaza", &["plz"]),
  ("residence", &["res"]),
  ("residences", &["res"]),
  ("square", &["sq", "sqr"]),
  ("station", &["sta", "stn"]),
  ("street", &["st"]),
  ("student", &["stud"]),
  ("tower", &["twr"]),
  ("towers", &["twrs"]),
  ("university", &["univ", "u"]),
];

/// Number words and their digit forms.
const NUMBER_WORDS: &[(&str, &str)] = &[
  ("one", "1"), ("two", "2"), ("three", "3"), ("four", "4"), ("five", "5"),
  ("six", "6"), ("seven", "7"), ("eight", "8"), ("nine", "9"), ("ten", "10"),
  ("eleven", "11"), ("twelve", "12"), ("thirteen", "13"), ("fourteen", "14"),
  ("fifteen", "15"), ("sixteen", "16"), ("seventeen", "17"),
  ("eighteen", "18"), ("nineteen", "19"), ("twenty", "20"), ("thirty", "30"),
  ("forty", "40"), ("fifty", "50"), ("sixty", "60"), ("seventy", "70"),
  ("eighty", "80"), ("ninety", "90"), ("hundred", "100"),
];

/// Ordinal words and their ordinal-digit forms.
const ORDINAL_WORDS: &[(&str, &str)] = &[
  ("first", "1st"), ("second", "2nd"), ("third", "3rd"), ("fourth", "4th"),
  ("fifth", "5th"), ("sixth", "6th"), ("seventh", "7th"), ("eighth", "8th"),
  ("ninth", "9th"), ("tenth", "10th"), ("eleventh", "11th"),
  ("twelfth", "12th"), ("thirteenth", "13th"), ("fourteenth", "14th"),
  ("fifteenth", "15th"), ("sixteenth", "16th"), ("seventeenth", "17th"),
  ("eighteenth", "18th"), ("nineteenth", "19th"), ("twentieth", "20th"),
];

/// Letter substitutions that survive common mishearings.
const PHONETIC_SUBS: &[(&str, &str)] = &[
  ("ph", "f"), ("f", "ph"), ("c", "k"), ("k", "c"),
  ("z", "s"), ("s", "z"), ("i", "y"), ("y", "i"),
];

// ─── Configuration ───────────────────────────────────────────────────────────

/// Per-deployment configuration for the generator.
///
/// Passed explicitly into [`AliasGenerator::new`] rather than living in
/// process-wide state, so multiple deployments (different universities) can
/// coexist in one process.
#[derive(Debug, Clone)]
pub struct AliasConfig {
  /// Words stripped before abbreviation and short-form passes.
  pub stop_words:    BTreeSet<String>,
  /// Word → abbreviation substitutions applied by the short-form pass.
  pub abbreviations: BTreeMap<String, Vec<String>>,
  /// Geography shorthand for the deployment, e.g. `"midtown"` →
  /// `["mid", "mdt"]`. Empty by default.
  pub locations:     BTreeMap<String, Vec<String>>,
}

impl Default for AliasConfig {
  fn default() -> Self {
    Self {
      stop_words:    DEFAULT_STOP_WORDS.iter().map(|w| (*w).to_owned()).collect(),
      abbreviations: DEFAULT_ABBREVIATIONS
        .iter()
        .map(|(w, subs)| {
          ((*w).to_owned(), subs.iter().map(|s| (*s).to_owned()).collect())
        })
        .collect(),
      locations:     BTreeMap::new(),
    }
  }
}

impl AliasConfig {
  /// The default tables plus deployment-specific location shorthand.
  pub fn with_locations(
    locations: impl IntoIterator<Item = (String, Vec<String>)>,
  ) -> Self {
    Self { locations: locations.into_iter().collect(), ..Self::default() }
  }
}

// ─── AliasSet ────────────────────────────────────────────────────────────────

/// All known textual variants of one entity name, each with a confidence
/// weight in `[0, 1]`.
///
/// The lowercased original name is always present with confidence 1.0.
/// Aliases are stored lower-case except initialism-style short forms (e.g.
/// `"SQ5"`), which downstream matchers must compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasSet {
  pub original_name: String,
  aliases:           BTreeMap<String, f64>,
}

impl AliasSet {
  fn new(original_name: &str) -> Self {
    let mut aliases = BTreeMap::new();
    aliases.insert(original_name.to_lowercase(), 1.0);
    Self { original_name: original_name.to_owned(), aliases }
  }

  /// Insert an alias, keeping the highest confidence seen so far.
  fn add(&mut self, alias: String, confidence: f64) {
    if alias.is_empty() {
      return;
    }
    let entry = self.aliases.entry(alias).or_insert(confidence);
    if confidence > *entry {
      *entry = confidence;
    }
  }

  pub fn contains(&self, alias: &str) -> bool {
    self.aliases.contains_key(alias)
  }

  pub fn confidence(&self, alias: &str) -> Option<f64> {
    self.aliases.get(alias).copied()
  }

  /// Iterate `(alias, confidence)` pairs.
  pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
    self.aliases.iter().map(|(a, c)| (a.as_str(), *c))
  }

  pub fn len(&self) -> usize { self.aliases.len() }

  pub fn is_empty(&self) -> bool { self.aliases.is_empty() }
}

// ─── Generator ───────────────────────────────────────────────────────────────

/// Runs the six alias-generation passes for a configured deployment.
pub struct AliasGenerator {
  config: AliasConfig,
}

impl AliasGenerator {
  pub fn new(config: AliasConfig) -> Self { Self { config } }

  /// Generate every alias variant for `name`.
  ///
  /// Never fails: an empty name yields the degenerate set containing only
  /// the empty string at confidence 1.0.
  pub fn generate(&self, name: &str) -> AliasSet {
    let mut set = AliasSet::new(name);
    let lower = name.to_lowercase();

    self.basic_variants(&lower, &mut set);
    self.abbreviation_variants(&lower, &mut set);
    self.short_form_variants(&lower, &mut set);
    self.phonetic_variants(&lower, &mut set);
    self.number_variants(&lower, &mut set);
    self.location_variants(&lower, &mut set);

    set
  }

  fn is_stop(&self, word: &str) -> bool {
    self.config.stop_words.contains(word)
  }

  // ── Pass 1: basic variants (0.9) ──────────────────────────────────────────

  fn basic_variants(&self, lower: &str, set: &mut AliasSet) {
    // Strip stop words.
    let kept: Vec<&str> =
      lower.split_whitespace().filter(|w| !self.is_stop(w)).collect();
    if !kept.is_empty() {
      set.add(kept.join(" "), W_BASIC);
    }

    // Each distinctive word on its own ("catalyst" for "Catalyst Midtown").
    // Short or numeric words are skipped; they collide with too much text.
    for word in &kept {
      if word.chars().count() >= 4
        && word.chars().all(|c| c.is_alphabetic())
      {
        set.add((*word).to_owned(), W_BASIC);
      }
    }

    // Drop a leading "the ".
    if let Some(rest) = lower.strip_prefix("the ") {
      set.add(rest.to_owned(), W_BASIC);
    }

    // Strip punctuation.
    let no_punct: String = lower
      .chars()
      .filter(|c| c.is_alphanumeric() || c.is_whitespace())
      .collect();
    set.add(no_punct, W_BASIC);

    // Concatenate all words.
    set.add(lower.split_whitespace().collect::<String>(), W_BASIC);
  }

  // ── Pass 2: abbreviation variants (0.8) ───────────────────────────────────

  fn abbreviation_variants(&self, lower: &str, set: &mut AliasSet) {
    let words: Vec<&str> = lower.split_whitespace().collect();

    // Initialism of non-stopword words.
    if words.len() > 1 {
      let initialism: String = words
        .iter()
        .filter(|w| !self.is_stop(w))
        .filter_map(|w| w.chars().next())
        .collect();
      if initialism.chars().count() >= 2 {
        set.add(initialism, W_ABBREVIATION);
      }
    }

    // Initialism of the letter-only words + each numeric token.
    let letters: String = words
      .iter()
      .filter(|w| !self.is_stop(w) && !w.chars().any(|c| c.is_ascii_digit()))
      .filter_map(|w| w.chars().next())
      .collect();
    let numbers: Vec<&str> =
      words.iter().filter_map(|w| digit_run(w)).collect();

    if !letters.is_empty() {
      for num in &numbers {
        set.add(format!("{letters}{num}"), W_ABBREVIATION);
      }
    }
  }

  // ── Pass 3: short-form variants (0.7) ─────────────────────────────────────

  fn short_form_variants(&self, lower: &str, set: &mut AliasSet) {
    let words: Vec<&str> = lower.split_whitespace().collect();

    // Numeric tokens: digit runs in the words, plus ordinal words ("fifth")
    // converted to digits.
    let mut numbers: Vec<String> = words
      .iter()
      .filter_map(|w| digit_run(w))
      .map(str::to_owned)
      .collect();
    for w in &words {
      if let Some((_, ordinal)) = ORDINAL_WORDS.iter().find(|(o, _)| o == w) {
        if let Some(run) = digit_run(ordinal) {
          numbers.push(run.to_owned());
        }
      }
    }

    let main_words: Vec<&str> = words
      .iter()
      .copied()
      .filter(|w| !self.is_stop(w) && !w.chars().any(|c| c.is_ascii_digit()))
      .collect();

    // Prefixes and consonant skeletons crossed with every number.
    for word in &main_words {
      for num in &numbers {
        if let Some(p) = prefix(word, 2) {
          set.add(format!("{}{num}", p.to_uppercase()), W_SHORT_FORM);
        }
        if let Some(p) = prefix(word, 3) {
          set.add(format!("{}{num}", p.to_uppercase()), W_SHORT_FORM);
        }
      }

      let skeleton: String =
        word.chars().filter(|c| !"aeiou".contains(*c)).collect();
      if skeleton.chars().count() >= 2 {
        for num in &numbers {
          set.add(format!("{}{num}", skeleton.to_uppercase()), W_SHORT_FORM);
        }
      }
    }

    // Initialism of all main words + number.
    if main_words.len() >= 2 {
      let initials: String = main_words
        .iter()
        .filter_map(|w| w.chars().next())
        .collect::<String>()
        .to_uppercase();
      for num in &numbers {
        set.add(format!("{initials}{num}"), W_SHORT_FORM);
      }
    }

    // Known abbreviation substitutions, verbatim and combined with numbers.
    for word in &words {
      if let Some(subs) = self.config.abbreviations.get(*word) {
        for abbrev in subs {
          let substituted: String =
            lower.replace(word, abbrev).split_whitespace().collect();
          set.add(substituted, W_SHORT_FORM);
          for num in &numbers {
            set.add(format!("{}{num}", abbrev.to_uppercase()), W_SHORT_FORM);
            set.add(format!("{abbrev}{num}"), W_SHORT_FORM);
          }
        }
      }
    }
  }

  // ── Pass 4: phonetic variants (0.6) ───────────────────────────────────────

  fn phonetic_variants(&self, lower: &str, set: &mut AliasSet) {
    if let Some(code) = soundex(lower) {
      set.add(code, W_PHONETIC);
    }

    for (from, to) in PHONETIC_SUBS {
      if lower.contains(from) {
        set.add(lower.replace(from, to), W_PHONETIC);
      }
    }
  }

  // ── Pass 5: number-word variants (0.85) ───────────────────────────────────

  fn number_variants(&self, lower: &str, set: &mut AliasSet) {
    for (word, digit) in NUMBER_WORDS {
      if lower.contains(word) {
        set.add(lower.replace(word, digit), W_NUMBER);
      }
    }

    for (word, ordinal) in ORDINAL_WORDS {
      if lower.contains(word) {
        set.add(lower.replace(word, ordinal), W_NUMBER);
        // Ordinal suffix stripped: "fifth" → "5" as well as "5th".
        if let Some(run) = digit_run(ordinal) {
          set.add(lower.replace(word, run), W_NUMBER);
        }
      }
    }
  }

  // ── Pass 6: location variants (0.75) ──────────────────────────────────────

  fn location_variants(&self, lower: &str, set: &mut AliasSet) {
    for (term, abbrevs) in &self.config.locations {
      let term_lower = term.to_lowercase();
      if !lower.contains(&term_lower) {
        continue;
      }
      for abbrev in abbrevs {
        let alias = lower.replace(&term_lower, &abbrev.to_lowercase());
        set.add(alias.split_whitespace().collect(), W_LOCATION);
        set.add(alias, W_LOCATION);
      }
    }
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// First `n` characters of a word, or `None` if it is shorter than `n`.
fn prefix(word: &str, n: usize) -> Option<&str> {
  let (end, _) = word.char_indices().nth(n - 1)?;
  let end = end + word[end..].chars().next().map_or(0, char::len_utf8);
  Some(&word[..end])
}

/// First run of ASCII digits in a word ("5th" → "5").
fn digit_run(word: &str) -> Option<&str> {
  let start = word.find(|c: char| c.is_ascii_digit())?;
  let rest = &word[start..];
  let end = rest
    .find(|c: char| !c.is_ascii_digit())
    .unwrap_or(rest.len());
  Some(&rest[..end])
}

/// Classic four-character soundex code ("catalyst" → "c342"), lower-cased
/// like every other non-initialism alias.
fn soundex(name: &str) -> Option<String> {
  fn digit(c: char) -> Option<char> {
    match c {
      'b' | 'f' | 'p' | 'v' => Some('1'),
      'c' | 'g' | 'j' | 'k' | 'q' | 's' | 'x' | 'z' => Some('2'),
      'd' | 't' => Some('3'),
      'l' => Some('4'),
      'm' | 'n' => Some('5'),
      'r' => Some('6'),
      _ => None,
    }
  }

  let mut letters = name
    .chars()
    .filter(|c| c.is_ascii_alphabetic())
    .map(|c| c.to_ascii_lowercase());

  let first = letters.next()?;
  let mut code = String::from(first);
  let mut prev = digit(first);

  for c in letters {
    // 'h' and 'w' are transparent; vowels reset the run.
    if c == 'h' || c == 'w' {
      continue;
    }
    let d = digit(c);
    if let Some(d) = d {
      if Some(d) != prev {
        code.push(d);
        if code.len() == 4 {
          break;
        }
      }
    }
    prev = d;
  }

  while code.len() < 4 {
    code.push('0');
  }
  Some(code)
}

// ─── AliasIndex ──────────────────────────────────────────────────────────────

/// The entity universe: one [`AliasSet`] per entity, in load order.
///
/// Built once per process run and shared read-only by the matcher and the
/// mention detector. Input order is preserved because the matcher's tie-break
/// is defined by it.
#[derive(Debug, Clone)]
pub struct AliasIndex {
  entries: Vec<(String, AliasSet)>,
}

impl AliasIndex {
  pub fn build<'a>(
    names: impl IntoIterator<Item = &'a str>,
    generator: &AliasGenerator,
  ) -> Self {
    let entries = names
      .into_iter()
      .map(|name| (name.to_owned(), generator.generate(name)))
      .collect();
    Self { entries }
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &AliasSet)> {
    self.entries.iter().map(|(n, s)| (n.as_str(), s))
  }

  pub fn get(&self, name: &str) -> Option<&AliasSet> {
    self.entries.iter().find(|(n, _)| n == name).map(|(_, s)| s)
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn generator() -> AliasGenerator {
    AliasGenerator::new(AliasConfig::default())
  }

  #[test]
  fn original_name_always_present_at_full_confidence() {
    for name in ["Catalyst Midtown", "Square On 5th", "The Connector"] {
      let set = generator().generate(name);
      assert_eq!(set.confidence(&name.to_lowercase()), Some(1.0));
    }
  }

  #[test]
  fn empty_name_yields_degenerate_set() {
    let set = generator().generate("");
    assert_eq!(set.len(), 1);
    assert_eq!(set.confidence(""), Some(1.0));
  }

  #[test]
  fn square_on_5th_gets_short_forms() {
    let set = generator().generate("Square On 5th");
    assert!(set.contains("SQ5"), "missing SQ5 in {set:?}");
    assert!(set.contains("sq5"));
    assert!(set.contains("SQR5"));
    assert_eq!(set.confidence("SQ5"), Some(0.7));
  }

  #[test]
  fn number_words_convert_to_digits() {
    let set = generator().generate("Five Points");
    assert_eq!(set.confidence("5 points"), Some(0.85));
  }

  #[test]
  fn ordinal_words_convert_both_ways() {
    let set = generator().generate("Fifth Street Flats");
    assert!(set.contains("5th street flats"));
    assert!(set.contains("5 street flats"));
  }

  #[test]
  fn distinctive_words_stand_alone() {
    let set = generator().generate("Catalyst Midtown");
    assert_eq!(set.confidence("catalyst"), Some(0.9));
    assert_eq!(set.confidence("midtown"), Some(0.9));

    // Numeric and stop words never stand alone.
    let set = generator().generate("Square On 5th");
    assert!(!set.contains("5th"));
    assert!(!set.contains("on"));
  }

  #[test]
  fn leading_the_is_dropped() {
    let set = generator().generate("The Connector");
    assert_eq!(set.confidence("connector"), Some(0.9));
  }

  #[test]
  fn stop_words_are_stripped() {
    let set = generator().generate("Catalyst Midtown Apartments");
    assert!(set.contains("catalyst midtown"));
  }

  #[test]
  fn punctuation_is_stripped() {
    let set = generator().generate("Hub @ Midtown");
    assert!(set.contains("hub  midtown"));
  }

  #[test]
  fn duplicate_alias_keeps_higher_confidence() {
    // "connector" comes out of the basic pass (0.9); a phonetic variant of a
    // name that happens to collide must not downgrade it.
    let mut set = AliasSet::new("The Connector");
    set.add("connector".into(), 0.9);
    set.add("connector".into(), 0.6);
    assert_eq!(set.confidence("connector"), Some(0.9));
  }

  #[test]
  fn phonetic_substitutions_apply() {
    let set = generator().generate("Catalyst");
    // c → k substitution.
    assert!(set.contains("katalyst"));
  }

  #[test]
  fn soundex_code_shape() {
    assert_eq!(soundex("catalyst"), Some("c342".into()));
    assert_eq!(soundex("robert"), Some("r163".into()));
    assert_eq!(soundex(""), None);
  }

  #[test]
  fn location_shorthand_applies_when_configured() {
    let config = AliasConfig::with_locations([(
      "midtown".to_owned(),
      vec!["mid".to_owned(), "mdt".to_owned()],
    )]);
    let set = AliasGenerator::new(config).generate("Catalyst Midtown");
    assert_eq!(set.confidence("catalyst mid"), Some(0.75));
    assert!(set.contains("catalystmdt"));
  }

  #[test]
  fn index_preserves_input_order() {
    let generator = generator();
    let index =
      AliasIndex::build(["Beta House", "Alpha Lofts"], &generator);
    let names: Vec<&str> = index.iter().map(|(n, _)| n).collect();
    assert_eq!(names, ["Beta House", "Alpha Lofts"]);
    assert!(index.get("Alpha Lofts").is_some());
    assert!(index.get("Gamma").is_none());
  }
}
