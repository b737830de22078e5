mod structured;
mod text;

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "pdf")]
pub use pdf::PdfLoader;
pub use structured::StructuredLoader;
pub use text::TextLoader;
