//! These models represent the objects passed between the assembler, the
//! providers and the session.
//!
//! There are several related formats we need to interact with:
//! - openai chat messages, sent to the OpenAI compatible endpoint
//! - anthropic messages, where system text lives outside the message list
//! - the JSON bodies accepted by the server routes
//!
//! We convert those formats into the internal structs at the edges, so the
//! internal models stay small.
pub mod message;
pub mod role;
