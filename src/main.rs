use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use lora_sensor_codec::payload::profiles::{SchemaRegistry, REV_B};
use lora_sensor_codec::util::hex::{decode_hex, encode_hex};
use lora_sensor_codec::{
    encode_uplink, init_logger, init_logger_with_level, log_info, DownlinkCodec, EncodeRequest,
    PayloadSchema, UplinkDecoder, UplinkMetadata, Value,
};

#[derive(Parser)]
#[command(name = "lora-codec")]
#[command(about = "Encode and decode sensor node LoRa payloads")]
struct Cli {
    /// Log at debug level regardless of RUST_LOG
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an uplink frame given as hex
    DecodeUplink {
        hex: String,
        /// Built-in schema name
        #[arg(short, long, default_value = REV_B)]
        schema: String,
        /// JSON schema file, takes precedence over --schema
        #[arg(long)]
        schema_file: Option<String>,
        /// Print the flat {field, value} list instead of the nested result
        #[arg(long)]
        flat: bool,
        #[arg(long)]
        gateway_id: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        snr: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        rssi: Option<f64>,
    },
    /// Decode a downlink frame given as hex
    DecodeDownlink { hex: String },
    /// Encode a downlink command (reset, force_read, set_interval)
    EncodeDownlink {
        command: String,
        #[arg(long)]
        value: Option<i64>,
    },
    /// Pack physical values into an uplink frame, e.g. temperature=21.5 motion=true
    EncodeUplink {
        #[arg(short, long, default_value = REV_B)]
        schema: String,
        #[arg(required = true)]
        values: Vec<String>,
    },
    /// List built-in schemas, or print one as JSON
    Schemas {
        #[arg(long)]
        show: Option<String>,
    },
}

fn parse_assignment(arg: &str) -> Result<(String, Value)> {
    let (name, raw) = arg
        .split_once('=')
        .with_context(|| format!("expected name=value, got '{arg}'"))?;
    let value = match raw {
        "true" => Value::Flag(true),
        "false" => Value::Flag(false),
        number => Value::Number(
            number
                .parse()
                .with_context(|| format!("'{number}' is not a number"))?,
        ),
    };
    Ok((name.to_string(), value))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        init_logger_with_level(log::LevelFilter::Debug);
    } else {
        init_logger();
    }

    let registry = SchemaRegistry::with_builtin();

    match cli.command {
        Commands::DecodeUplink {
            hex,
            schema,
            schema_file,
            flat,
            gateway_id,
            snr,
            rssi,
        } => {
            let schema = match schema_file {
                Some(path) => PayloadSchema::from_json_file(&path)
                    .with_context(|| format!("loading schema from {path}"))?,
                None => registry.get(&schema)?.clone(),
            };
            let bytes = decode_hex(&hex)?;
            let metadata = UplinkMetadata {
                gateway_id,
                snr,
                rssi,
            };
            let result = UplinkDecoder::new().decode_with_metadata(&bytes, &schema, metadata);
            if flat {
                println!("{}", serde_json::to_string_pretty(&result.to_fields())?);
            } else {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            if !result.is_ok() {
                bail!("decode failed: {}", result.errors.join("; "));
            }
        }
        Commands::DecodeDownlink { hex } => {
            let bytes = decode_hex(&hex)?;
            let command = DownlinkCodec::decode(&bytes);
            println!("{}", serde_json::to_string_pretty(&command.describe())?);
        }
        Commands::EncodeDownlink { command, value } => {
            let encoded = DownlinkCodec::encode_request(&EncodeRequest::new(command, value));
            if !encoded.should_send() {
                log_info("command not encodable, nothing to send");
            }
            println!(
                "{}",
                serde_json::json!({ "bytes": encode_hex(&encoded.bytes), "fPort": encoded.port })
            );
        }
        Commands::EncodeUplink { schema, values } => {
            let schema = registry.get(&schema)?;
            let parsed = values
                .iter()
                .map(|v| parse_assignment(v))
                .collect::<Result<Vec<_>>>()?;
            let borrowed: Vec<(&str, Value)> =
                parsed.iter().map(|(n, v)| (n.as_str(), *v)).collect();
            println!("{}", encode_hex(&encode_uplink(schema, &borrowed)?));
        }
        Commands::Schemas { show } => match show {
            Some(name) => println!("{}", registry.get(&name)?.to_json_pretty()?),
            None => {
                for name in registry.names() {
                    let schema = registry.get(name)?;
                    println!("{name}\t{} bytes", schema.total_length());
                }
            }
        },
    }

    Ok(())
}
