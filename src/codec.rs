//! Frame codec for tokio
//!
//! A frame is one JSON object terminated by `\n`. serde_json never emits a
//! raw newline inside a value, so the line break alone delimits frames.
//! Wraps [`LinesCodec`] and parses each line into a typed message.

use std::marker::PhantomData;

use bytes::BytesMut;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::codec::{Decoder, Encoder, LinesCodec};

use crate::error::FrameError;
use crate::message::{ClientMessage, ServerMessage};

/// Default upper bound for one inbound client frame, in bytes
///
/// Server frames carry whole room histories and are not bounded; clients
/// read them with [`FrameCodec::unbounded`].
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 64 * 1024;

/// Codec used by the server: decodes client frames, encodes server frames
pub type ServerCodec = FrameCodec<ClientMessage, ServerMessage>;

/// Codec used by clients: decodes server frames, encodes client frames
pub type ClientCodec = FrameCodec<ServerMessage, ClientMessage>;

/// Newline-delimited JSON codec decoding `In` and encoding `Out`
pub struct FrameCodec<In, Out> {
    inner: LinesCodec,
    _marker: PhantomData<fn(Out) -> In>,
}

impl<In, Out> FrameCodec<In, Out> {
    /// Create a codec with the default maximum frame length
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_FRAME_LENGTH)
    }

    /// Create a codec accepting frames of any length
    pub fn unbounded() -> Self {
        Self {
            inner: LinesCodec::new(),
            _marker: PhantomData,
        }
    }

    /// Create a codec rejecting frames longer than `max_length` bytes
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            inner: LinesCodec::new_with_max_length(max_length),
            _marker: PhantomData,
        }
    }
}

impl<In, Out> Default for FrameCodec<In, Out> {
    fn default() -> Self {
        Self::new()
    }
}

impl<In: DeserializeOwned, Out> FrameCodec<In, Out> {
    // Blank lines carry no frame and are skipped.
    fn parse(line: String) -> Result<Option<In>, FrameError> {
        if line.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&line)?))
    }
}

impl<In: DeserializeOwned, Out> Decoder for FrameCodec<In, Out> {
    type Item = In;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<In>, FrameError> {
        while let Some(line) = self.inner.decode(src)? {
            if let Some(frame) = Self::parse(line)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<In>, FrameError> {
        while let Some(line) = self.inner.decode_eof(src)? {
            if let Some(frame) = Self::parse(line)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}

impl<In, Out: Serialize> Encoder<Out> for FrameCodec<In, Out> {
    type Error = FrameError;

    fn encode(&mut self, item: Out, dst: &mut BytesMut) -> Result<(), FrameError> {
        let json = serde_json::to_string(&item)?;
        self.inner.encode(json, dst)?;
        Ok(())
    }
}
