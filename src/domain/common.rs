/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Implemented by anything that tracks installment progress so display
/// ordering can treat purchases and derived rows alike.
pub trait InstallmentProgress {
    fn is_settled(&self) -> bool;
}

// Re-export common dependencies so consumers can rely on this module as a façade.
pub use chrono;
pub use serde;
