use crate::models::InstitutionRecord;

/// One year's institutions usable for recommendation: every entry has a positive
/// admission rank, and entries are ordered by it, most selective first.
#[derive(Debug, Clone, Default)]
pub struct InstitutionTable {
    year: i32,
    entries: Vec<RankedInstitution>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedInstitution {
    pub admission_rank: u64,
    pub record: InstitutionRecord,
}

impl InstitutionTable {
    pub fn from_records(year: i32, records: Vec<InstitutionRecord>) -> Self {
        let mut entries: Vec<RankedInstitution> = records
            .into_iter()
            .filter_map(|record| {
                record.effective_rank().map(|admission_rank| RankedInstitution {
                    admission_rank,
                    record,
                })
            })
            .collect();
        // Stable: ties keep dataset order.
        entries.sort_by_key(|e| e.admission_rank);
        Self { year, entries }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn entries(&self) -> &[RankedInstitution] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
