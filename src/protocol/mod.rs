//! Protocol Module
//!
//! Plaintext, line-delimited wire protocol.
//!
//! ## Requests
//! One command per line: `<KEYWORD> [free-text arguments]`, keyword
//! case-sensitive.
//!
//! ## Responses
//! Free-form UTF-8 text followed by [`RESPONSE_TERMINATOR`]. A client buffers
//! until it sees the terminator; everything before it is the body.

mod framing;
mod sink;

pub use framing::{
    encode_response, read_response, write_request, write_response, LineSplitter,
    RESPONSE_TERMINATOR,
};
pub use sink::ResponseSink;
