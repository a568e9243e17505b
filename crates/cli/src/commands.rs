//! CLI commands.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context};
use clap::{Args, Subcommand};
use envelope::{Message, MessageType, Tensor, TensorData};
use serde::Serialize;
use streaming::{IdPolicy, MessageCodec};
use tracing::info;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build an envelope and write it to a frame file
    Encode(EncodeArgs),
    /// Decode a frame file and describe the envelope
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
pub struct EncodeArgs {
    /// operation_request, operation_response, user_function_request,
    /// user_function_response or shutdown
    #[arg(long)]
    pub kind: MessageType,

    /// Correlation id; unmatched when absent
    #[arg(long, allow_negative_numbers = true)]
    pub id: Option<i64>,

    /// Metadata as hex
    #[arg(long, default_value = "")]
    pub meta: String,

    /// Payload as DTYPE:SHAPE:VALUES, e.g. f32:2x2:1,2,3,4 (empty SHAPE is a scalar)
    #[arg(long = "tensor", value_name = "SPEC", value_parser = parse_tensor)]
    pub tensors: Vec<Tensor>,

    /// Leave the correlation id off the wire
    #[arg(long)]
    pub omit_id: bool,

    /// Frame file to write
    #[arg(short, long)]
    pub out: PathBuf,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Frame file to read
    pub path: PathBuf,

    /// Print the description as JSON
    #[arg(long)]
    pub json: bool,
}

/// What a command produced, ready to print.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    Encoded {
        path: PathBuf,
        frame_len: usize,
        summary: MessageSummary,
    },
    Inspected {
        summary: MessageSummary,
        json: bool,
    },
}

/// Printable description of an envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageSummary {
    pub kind: MessageType,
    pub id: Option<i64>,
    pub metadata: String,
    pub payloads: Vec<PayloadSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadSummary {
    pub dtype: String,
    pub shape: Vec<usize>,
    pub bytes: usize,
}

impl From<&Message> for MessageSummary {
    fn from(message: &Message) -> Self {
        Self {
            kind: message.kind(),
            id: message.correlation(),
            metadata: hex::encode(message.metadata()),
            payloads: message
                .payloads()
                .iter()
                .map(|tensor| PayloadSummary {
                    dtype: tensor.dtype().to_string(),
                    shape: tensor.shape().to_vec(),
                    bytes: tensor.byte_len(),
                })
                .collect(),
        }
    }
}

impl Command {
    pub fn execute(&self, codec: &MessageCodec) -> anyhow::Result<CommandResult> {
        match self {
            Command::Encode(args) => encode(args, codec),
            Command::Inspect(args) => inspect(args, codec),
        }
    }
}

fn encode(args: &EncodeArgs, codec: &MessageCodec) -> anyhow::Result<CommandResult> {
    let metadata = hex::decode(&args.meta).context("metadata is not valid hex")?;
    let mut message = Message::new(metadata, args.tensors.clone(), args.kind);
    if let Some(id) = args.id {
        message.set_id(id);
    }

    let codec = if args.omit_id {
        MessageCodec::new(codec.config().clone().with_id_policy(IdPolicy::Omit))
    } else {
        codec.clone()
    };
    let frame = codec.encode(&message)?;
    fs::write(&args.out, &frame).with_context(|| format!("writing {}", args.out.display()))?;
    info!(path = %args.out.display(), len = frame.len(), "wrote frame");

    Ok(CommandResult::Encoded {
        path: args.out.clone(),
        frame_len: frame.len(),
        summary: MessageSummary::from(&message),
    })
}

fn inspect(args: &InspectArgs, codec: &MessageCodec) -> anyhow::Result<CommandResult> {
    let frame = fs::read(&args.path).with_context(|| format!("reading {}", args.path.display()))?;
    let message = codec
        .decode(&frame)
        .with_context(|| format!("decoding {}", args.path.display()))?;

    Ok(CommandResult::Inspected {
        summary: MessageSummary::from(&message),
        json: args.json,
    })
}

/// Parse `DTYPE:SHAPE:VALUES`.
pub fn parse_tensor(spec: &str) -> anyhow::Result<Tensor> {
    let mut parts = spec.splitn(3, ':');
    let (Some(dtype), Some(shape), Some(values)) = (parts.next(), parts.next(), parts.next())
    else {
        bail!("expected DTYPE:SHAPE:VALUES, got `{spec}`");
    };

    let shape = if shape.is_empty() {
        Vec::new()
    } else {
        parse_list::<usize>(shape, 'x').context("bad shape")?
    };

    let data: TensorData = match dtype {
        "f32" => parse_list::<f32>(values, ',')?.into(),
        "f64" => parse_list::<f64>(values, ',')?.into(),
        "i32" => parse_list::<i32>(values, ',')?.into(),
        "i64" => parse_list::<i64>(values, ',')?.into(),
        "u8" => parse_list::<u8>(values, ',')?.into(),
        "bool" => parse_list::<bool>(values, ',')?.into(),
        other => bail!("unknown dtype `{other}`"),
    };

    Ok(Tensor::new(shape, data)?)
}

fn parse_list<T>(raw: &str, separator: char) -> anyhow::Result<Vec<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    raw.split(separator)
        .map(|item| {
            item.trim()
                .parse::<T>()
                .with_context(|| format!("bad value `{item}`"))
        })
        .collect()
}

impl fmt::Display for MessageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "kind:     {}", self.kind)?;
        match self.id {
            Some(id) => writeln!(f, "id:       {id}")?,
            None => writeln!(f, "id:       unmatched")?,
        }
        writeln!(f, "metadata: {} bytes [{}]", self.metadata.len() / 2, self.metadata)?;
        write!(f, "payloads: {}", self.payloads.len())?;
        for (index, payload) in self.payloads.iter().enumerate() {
            write!(
                f,
                "\n  #{index} {}{:?} ({} bytes)",
                payload.dtype, payload.shape, payload.bytes
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandResult::Encoded {
                path,
                frame_len,
                summary,
            } => {
                writeln!(f, "wrote {frame_len} bytes to {}", path.display())?;
                write!(f, "{summary}")
            }
            CommandResult::Inspected {
                summary,
                json: true,
            } => {
                let rendered = serde_json::to_string_pretty(summary).map_err(|_| fmt::Error)?;
                f.write_str(&rendered)
            }
            CommandResult::Inspected { summary, .. } => write!(f, "{summary}"),
        }
    }
}
