pub mod finder;
pub mod sample;
pub mod serpapi;
pub mod traits;
pub mod types;

pub use finder::HostelFinder;
pub use sample::SampleProvider;
pub use serpapi::SerpApiProvider;
pub use traits::SearchProvider;
