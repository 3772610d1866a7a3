//! # Misspelling Prompts
//!
//! The instructional prompt that asks a model for misspelled variants of a
//! search query. The output format section is what `parse_variants` relies on:
//! one variant per line, prefixed with `-`, rationale in parentheses.

/// Placeholders: `{n}`, `{query}`, `{abbreviations}`
pub const MISSPELLING_PROMPT: &str = r#"
Generate {n} different misspelled versions of this search query: "{query}"

Rules for generating misspellings:
1. Keep abbreviations like {abbreviations} unchanged
2. Include different types of errors:
   - Omission (Missing letters)
   - Transposition (Swapped letters)
   - Phonetic mistakes (f/ph, k/c, etc.)
   - Repetition
   - Multiple typos in one variant
3. Each variant should still be readable and recognizable
4. Output format must be EXACTLY like this example:

Original Query: machine learning applications
- machin learning applications (missing "e" in "machine")
- mashine learning applications (phonetically similar spelling of "machine")
- machine lerning aplications (missing "a" in "learning" and "p" in "applications")
- machin lerning aplications (combining multiple typos)
- mahcine learing aplication (transposed letters in "machine" and typos)

Generate misspellings for: "{query}"
"#;

/// Joins the protected tokens for the prompt, e.g. `JFK, NBC, US`.
///
/// Falls back to the lab's original examples when the set is empty so the
/// rule still reads naturally.
pub fn get_abbreviation_list<'a, I>(abbreviations: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let joined = abbreviations
        .into_iter()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        "JFK, NBC, US".to_string()
    } else {
        joined
    }
}

/// Fills in [`MISSPELLING_PROMPT`].
pub fn build_misspelling_prompt(query: &str, n: usize, abbreviations: &str) -> String {
    MISSPELLING_PROMPT
        .replace("{n}", &n.to_string())
        .replace("{abbreviations}", abbreviations)
        .replace("{query}", query)
}
