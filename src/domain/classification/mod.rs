//! Classification domain: labels, requests, verdicts, and model instructions

mod instruction;
mod label;
mod request;
mod verdict;

pub use instruction::ModelInstruction;
pub use label::Label;
pub use request::ClassificationRequest;
pub use verdict::Verdict;
