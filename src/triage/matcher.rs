use crate::models::MedicalRecord;

/// A record selected for a query, with the keyword that selected it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymptomMatch<'a> {
    pub record: &'a MedicalRecord,
    pub keyword: &'a str,
}

/// Find the single record whose matching keyword is longest.
///
/// Every keyword of every record is tested as a substring of the lowercased
/// query. Only a strictly longer keyword replaces the current best, so on a
/// length tie the record earlier in the corpus is kept.
pub fn find_best_match<'a>(text: &str, corpus: &'a [MedicalRecord]) -> Option<SymptomMatch<'a>> {
    let lower = text.to_lowercase();
    let mut best: Option<(SymptomMatch<'a>, usize)> = None;

    for record in corpus {
        for keyword in &record.keywords {
            if !lower.contains(keyword.as_str()) {
                continue;
            }
            // Length in characters, so accented keywords are not favoured.
            let len = keyword.chars().count();
            if best.map_or(true, |(_, best_len)| len > best_len) {
                let hit = SymptomMatch {
                    record,
                    keyword: keyword.as_str(),
                };
                best = Some((hit, len));
            }
        }
    }

    best.map(|(hit, _)| hit)
}
