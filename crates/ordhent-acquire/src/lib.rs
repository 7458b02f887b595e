pub mod http;
pub mod output;
pub mod phrontistery;
pub mod translate;

pub use phrontistery::{fetch, words, PageSource, Phrontistery};
pub use translate::{translate, GoogleTranslator, Translator};
