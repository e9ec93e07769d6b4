pub mod charts;
pub mod csv;
pub mod powerbi;
pub mod report;
pub mod session;
pub mod templates;
