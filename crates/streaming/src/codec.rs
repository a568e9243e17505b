//! Binary frame codec for message envelopes.
//!
//! See `protocol` for the layout. Each payload is written by `encode_tensor`
//! on its own, so a payload can also be shipped or parsed independently of
//! the frame that carries it.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use envelope::{DType, Message, MessageType, Tensor, TensorData, UNMATCHED_ID};
use tracing::{trace, warn};

use crate::config::{CodecConfig, IdPolicy};
use crate::error::{Result, StreamingError};
use crate::protocol::{FLAG_HAS_ID, HEADER_LEN, KNOWN_FLAGS, MAGIC, MIN_PAYLOAD_LEN, VERSION};

/// Encodes envelopes into frames and back.
///
/// Stateless apart from its configuration; clone it freely.
#[derive(Clone, Debug, Default)]
pub struct MessageCodec {
    config: CodecConfig,
}

impl MessageCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode one envelope into a frame.
    ///
    /// Refuses `Unknown` messages and anything over the configured limits.
    pub fn encode(&self, message: &Message) -> Result<Bytes> {
        if message.kind() == MessageType::Unknown {
            warn!("refusing to encode a message of kind unknown");
            metrics::counter!("envelope_frames_rejected_total").increment(1);
            return Err(StreamingError::UnknownKind);
        }

        let metadata = message.metadata();
        let metadata_limit = self.config.max_metadata_len.min(u32::MAX as usize);
        if metadata.len() > metadata_limit {
            return Err(StreamingError::MetadataTooLarge {
                len: metadata.len(),
                limit: metadata_limit,
            });
        }

        let id = match self.config.id_policy {
            IdPolicy::Transmit => message.correlation(),
            IdPolicy::Omit => None,
        };

        let count = payload_count(message.payloads().len())?;
        // Checked before allocating.
        let len = encoded_len(message, id.is_some());
        if len > self.config.max_frame_len {
            metrics::counter!("envelope_frames_rejected_total").increment(1);
            return Err(StreamingError::FrameTooLarge {
                len,
                limit: self.config.max_frame_len,
            });
        }

        let mut buf = BytesMut::with_capacity(len);
        buf.put_slice(&MAGIC);
        buf.put_u8(VERSION);
        buf.put_u8(message.kind().into());
        buf.put_u8(if id.is_some() { FLAG_HAS_ID } else { 0 });
        if let Some(id) = id {
            buf.put_i64(id);
        }
        buf.put_u32(metadata.len() as u32);
        buf.put_slice(metadata);

        buf.put_u32(count);
        for tensor in message.payloads() {
            encode_tensor(tensor, &mut buf)?;
        }
        debug_assert_eq!(buf.len(), len);

        trace!(
            kind = %message.kind(),
            id = message.id(),
            payloads = message.payloads().len(),
            len = buf.len(),
            "encoded frame"
        );
        metrics::counter!("envelope_frames_encoded_total").increment(1);
        Ok(buf.freeze())
    }

    /// Decode one complete frame.
    ///
    /// The frame must be consumed exactly; `Unknown` kinds are rejected.
    pub fn decode(&self, frame: &[u8]) -> Result<Message> {
        let result = self.decode_frame(frame);
        match &result {
            Ok(message) => {
                trace!(kind = %message.kind(), id = message.id(), len = frame.len(), "decoded frame");
                metrics::counter!("envelope_frames_decoded_total").increment(1);
            }
            Err(err) => {
                warn!(error = %err, len = frame.len(), "rejected frame");
                metrics::counter!("envelope_frames_rejected_total").increment(1);
            }
        }
        result
    }

    fn decode_frame(&self, frame: &[u8]) -> Result<Message> {
        if frame.len() > self.config.max_frame_len {
            return Err(StreamingError::FrameTooLarge {
                len: frame.len(),
                limit: self.config.max_frame_len,
            });
        }

        let mut reader = FrameReader::new(frame);
        reader.ensure(HEADER_LEN)?;

        let mut magic = [0u8; 4];
        reader.buf.copy_to_slice(&mut magic);
        if magic != MAGIC {
            return Err(StreamingError::BadMagic(magic));
        }

        let version = reader.u8()?;
        if version != VERSION {
            return Err(StreamingError::UnsupportedVersion(version));
        }

        let kind = MessageType::try_from(reader.u8()?)?;
        if kind == MessageType::Unknown {
            return Err(StreamingError::UnknownKind);
        }

        let flags = reader.u8()?;
        if flags & !KNOWN_FLAGS != 0 {
            return Err(StreamingError::UnsupportedFlags(flags));
        }
        let id = if flags & FLAG_HAS_ID != 0 {
            reader.i64()?
        } else {
            UNMATCHED_ID
        };

        let metadata_len = reader.u32()? as usize;
        if metadata_len > self.config.max_metadata_len {
            return Err(StreamingError::MetadataTooLarge {
                len: metadata_len,
                limit: self.config.max_metadata_len,
            });
        }
        let metadata = reader.bytes(metadata_len)?.to_vec();

        let count = reader.u32()? as usize;
        // A hostile count must not drive the allocation.
        let mut payloads = Vec::with_capacity(count.min(reader.remaining() / MIN_PAYLOAD_LEN));
        for index in 0..count {
            payloads.push(read_tensor(&mut reader, index)?);
        }

        if reader.remaining() > 0 {
            return Err(StreamingError::TrailingBytes(reader.remaining()));
        }

        Ok(Message::with_id(metadata, payloads, kind, id))
    }
}

/// Append one payload to `buf`.
pub fn encode_tensor(tensor: &Tensor, buf: &mut BytesMut) -> Result<()> {
    let ndim = u32::try_from(tensor.ndim())
        .map_err(|_| StreamingError::DimensionTooLarge(tensor.ndim() as u64))?;

    buf.reserve(encoded_tensor_len(tensor));
    buf.put_u8(tensor.dtype().into());
    buf.put_u32(ndim);
    for dim in tensor.shape() {
        buf.put_u64(*dim as u64);
    }
    buf.put_u64(tensor.byte_len() as u64);

    match tensor.data() {
        TensorData::F32(values) => values.iter().for_each(|v| buf.put_f32_le(*v)),
        TensorData::F64(values) => values.iter().for_each(|v| buf.put_f64_le(*v)),
        TensorData::I32(values) => values.iter().for_each(|v| buf.put_i32_le(*v)),
        TensorData::I64(values) => values.iter().for_each(|v| buf.put_i64_le(*v)),
        TensorData::U8(values) => buf.put_slice(values),
        TensorData::Bool(values) => values.iter().for_each(|v| buf.put_u8(u8::from(*v))),
    }
    Ok(())
}

/// Decode a single payload produced by `encode_tensor`.
pub fn decode_tensor(bytes: &[u8]) -> Result<Tensor> {
    let mut reader = FrameReader::new(bytes);
    let tensor = read_tensor(&mut reader, 0)?;
    if reader.remaining() > 0 {
        return Err(StreamingError::TrailingBytes(reader.remaining()));
    }
    Ok(tensor)
}

fn read_tensor(reader: &mut FrameReader<'_>, index: usize) -> Result<Tensor> {
    let tag = reader.u8()?;
    let dtype = DType::try_from(tag).map_err(|err| StreamingError::UnknownDType(err.number))?;
    let ndim = reader.u32()? as usize;
    reader.ensure(ndim.saturating_mul(8))?;

    let shape = (0..ndim)
        .map(|_| {
            let dim = reader.buf.get_u64();
            usize::try_from(dim).map_err(|_| StreamingError::DimensionTooLarge(dim))
        })
        .collect::<Result<Vec<usize>>>()?;

    let byte_len = reader.u64()?;
    if byte_len % dtype.size_of() as u64 != 0 {
        return Err(StreamingError::MisalignedTensorData { dtype, len: byte_len });
    }
    let byte_len =
        usize::try_from(byte_len).map_err(|_| StreamingError::DimensionTooLarge(byte_len))?;
    let mut raw = reader.bytes(byte_len)?;
    let count = byte_len / dtype.size_of();

    let data = match dtype {
        DType::F32 => TensorData::F32((0..count).map(|_| raw.get_f32_le()).collect()),
        DType::F64 => TensorData::F64((0..count).map(|_| raw.get_f64_le()).collect()),
        DType::I32 => TensorData::I32((0..count).map(|_| raw.get_i32_le()).collect()),
        DType::I64 => TensorData::I64((0..count).map(|_| raw.get_i64_le()).collect()),
        DType::U8 => TensorData::U8(raw.to_vec()),
        DType::Bool => TensorData::Bool(
            raw.iter()
                .map(|byte| match byte {
                    0 => Ok(false),
                    1 => Ok(true),
                    other => Err(StreamingError::InvalidBool(*other)),
                })
                .collect::<Result<Vec<bool>>>()?,
        ),
    };

    Tensor::new(shape, data).map_err(|source| StreamingError::InvalidTensor { index, source })
}

fn payload_count(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| StreamingError::DimensionTooLarge(len as u64))
}

/// Exact size of the frame `encode` writes for `message`.
fn encoded_len(message: &Message, with_id: bool) -> usize {
    let id_len = if with_id { 8 } else { 0 };
    message
        .payloads()
        .iter()
        .map(encoded_tensor_len)
        .fold(HEADER_LEN + id_len + 4 + message.metadata().len() + 4, usize::saturating_add)
}

/// Exact size of the bytes `encode_tensor` appends for `tensor`.
pub fn encoded_tensor_len(tensor: &Tensor) -> usize {
    MIN_PAYLOAD_LEN
        .saturating_add(tensor.ndim().saturating_mul(8))
        .saturating_add(tensor.byte_len())
}

/// Cursor over a frame that reports where it ran short.
struct FrameReader<'a> {
    buf: &'a [u8],
    total: usize,
}

impl<'a> FrameReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            total: buf.len(),
        }
    }

    fn remaining(&self) -> usize {
        self.buf.len()
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if self.buf.len() < n {
            return Err(StreamingError::Truncated {
                offset: self.total - self.buf.len(),
                need: n - self.buf.len(),
            });
        }
        Ok(())
    }

    fn u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    fn u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.buf.get_u32())
    }

    fn u64(&mut self) -> Result<u64> {
        self.ensure(8)?;
        Ok(self.buf.get_u64())
    }

    fn i64(&mut self) -> Result<i64> {
        self.ensure(8)?;
        Ok(self.buf.get_i64())
    }

    fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Message {
        Message::with_id(
            vec![0x01, 0x02],
            vec![
                Tensor::new(vec![2, 2], vec![1.0f32, -2.5, 3.25, 4.0]).unwrap(),
                Tensor::new(vec![], vec![true]).unwrap(),
            ],
            MessageType::OperationRequest,
            42,
        )
    }

    #[test]
    fn test_round_trip() {
        let codec = MessageCodec::default();
        let frame = codec.encode(&request()).unwrap();
        assert_eq!(&frame[..4], b"RPCE");
        assert_eq!(codec.decode(&frame).unwrap(), request());
    }

    #[test]
    fn test_unmatched_id_not_written() {
        let codec = MessageCodec::default();
        let mut message = request();
        message.clear_id();
        let with_id = codec.encode(&request()).unwrap();
        let without_id = codec.encode(&message).unwrap();
        assert_eq!(with_id.len(), without_id.len() + 8);
        assert_eq!(codec.decode(&without_id).unwrap().id(), UNMATCHED_ID);
    }

    #[test]
    fn test_omit_policy_drops_id() {
        let codec = MessageCodec::new(CodecConfig::new().with_id_policy(IdPolicy::Omit));
        let decoded = codec.decode(&codec.encode(&request()).unwrap()).unwrap();
        assert_eq!(decoded.id(), UNMATCHED_ID);
        assert_eq!(decoded.metadata(), request().metadata());
        assert_eq!(decoded.payloads(), request().payloads());
    }

    #[test]
    fn test_unknown_refused_on_encode() {
        let codec = MessageCodec::default();
        assert_eq!(
            codec.encode(&Message::default()),
            Err(StreamingError::UnknownKind)
        );
    }

    #[test]
    fn test_unknown_rejected_on_decode() {
        let codec = MessageCodec::default();
        let mut frame = codec.encode(&request()).unwrap().to_vec();
        frame[5] = MessageType::Unknown.into();
        assert_eq!(codec.decode(&frame), Err(StreamingError::UnknownKind));

        frame[5] = 200;
        assert!(matches!(codec.decode(&frame), Err(StreamingError::InvalidKind(_))));
    }

    #[test]
    fn test_tensor_encodes_independently() {
        let tensor = Tensor::new(vec![3, 1], vec![-1i64, 0, i64::MAX]).unwrap();
        let mut buf = BytesMut::new();
        encode_tensor(&tensor, &mut buf).unwrap();
        assert_eq!(decode_tensor(&buf).unwrap(), tensor);
    }

    #[test]
    fn test_encoded_len_is_exact() {
        let message = request();
        assert_eq!(
            encoded_len(&message, true),
            MessageCodec::default().encode(&message).unwrap().len()
        );
        for tensor in message.payloads() {
            let mut buf = BytesMut::new();
            encode_tensor(tensor, &mut buf).unwrap();
            assert_eq!(buf.len(), encoded_tensor_len(tensor));
        }
    }

    #[test]
    fn test_unknown_dtype_rejected() {
        let mut buf = BytesMut::new();
        encode_tensor(&Tensor::vector(vec![1u8]), &mut buf).unwrap();
        buf[0] = 6;
        assert_eq!(decode_tensor(&buf), Err(StreamingError::UnknownDType(6)));
    }

    #[test]
    fn test_bad_bool_rejected() {
        let mut buf = BytesMut::new();
        encode_tensor(&Tensor::vector(vec![true, false]), &mut buf).unwrap();
        let last = buf.len() - 1;
        buf[last] = 2;
        assert_eq!(decode_tensor(&buf), Err(StreamingError::InvalidBool(2)));
    }
}
