//! The four pipeline stages, in run order.
//!
//! Each stage reads its input from a checkpoint store and writes its
//! output to the next one, so any stage can be rerun on its own and a
//! killed run resumes from whatever the stores already hold.

pub mod backlog;
pub mod parse;
pub mod publish;
pub mod scrape;
pub mod serialize;

pub use backlog::{enumerate_backlog, Backlog};
pub use parse::{run_parse, ParseReport};
pub use publish::{
    decode_payload, embedded_payload, encode_payload, run_publish, PublishConfig, PublishReport,
};
pub use scrape::{run_scrape, ScrapeConfig, ScrapeReport};
pub use serialize::{run_serialize, SerializeReport};
