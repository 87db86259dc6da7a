//! Keyword record model and the fixed column set.

pub const COL_RF_FILTER_KEYWORDS: &str = "RF filter keywords";
pub const COL_KEYWORD_COLORS: &str = "Keyword colors";
pub const COL_RISK_SCORE: &str = "Risk Score";
pub const COL_CUSTOMER: &str = "Customer";
pub const COL_PERMUTATIONS: &str = "Permutations";
pub const COL_NOTES: &str = "Notes";

/// Required input columns, which are also the output columns in write order.
pub const COLUMNS: [&str; 6] = [
    COL_RF_FILTER_KEYWORDS,
    COL_KEYWORD_COLORS,
    COL_RISK_SCORE,
    COL_CUSTOMER,
    COL_PERMUTATIONS,
    COL_NOTES,
];

/// One row of keyword metadata plus its derived variations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub rf_filter_keywords: String,
    pub keyword_colors: String,
    pub risk_score: String,
    pub customer: String,
    pub permutations: String,
    pub notes: String,
}

impl Record {
    /// Build a record from cells already ordered like [`COLUMNS`].
    pub fn from_cells(cells: [String; 6]) -> Self {
        let [rf_filter_keywords, keyword_colors, risk_score, customer, permutations, notes] =
            cells;
        Self {
            rf_filter_keywords,
            keyword_colors,
            risk_score,
            customer,
            permutations,
            notes,
        }
    }

    /// Cells in [`COLUMNS`] order.
    pub fn cells(&self) -> [&str; 6] {
        [
            &self.rf_filter_keywords,
            &self.keyword_colors,
            &self.risk_score,
            &self.customer,
            &self.permutations,
            &self.notes,
        ]
    }

    /// Trimmed primary keyword, or `None` when it is blank.
    pub fn keyword(&self) -> Option<&str> {
        let trimmed = self.rf_filter_keywords.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}
