use chrono::NaiveDate;

/// Why a render pass stopped before producing any aggregates.
///
/// None of these are fatal: the next change to the filter controls starts a
/// fresh pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Halt {
    #[error("Silakan pilih rentang tanggal (dua tanggal).")]
    IncompleteDateRange,

    #[error("Tanggal awal {start} jatuh setelah tanggal akhir {end}.")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },

    #[error(
        "Tidak ada data yang tersedia untuk filter yang dipilih. \
         Silakan ubah rentang tanggal atau pilihan lainnya."
    )]
    EmptyResult,
}

impl Halt {
    /// Input problems are shown as errors next to the controls; an empty
    /// result is a warning in place of the charts.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Halt::IncompleteDateRange | Halt::InvertedDateRange { .. }
        )
    }
}
