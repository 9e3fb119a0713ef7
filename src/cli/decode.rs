//! Payload decoding commands

use clap::Subcommand;
use starknet_event_harvester::{decode_byte_array, decode_u256, Felt, FeltCursor};

#[derive(Subcommand)]
pub enum DecodeCommands {
    /// Decode a packed ByteArray: word count, full words, pending word, pending length
    ByteArray {
        /// Payload words, hex (0x...) or decimal
        #[arg(required = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },

    /// Recombine a u256 from its low and high 128-bit halves
    U256 {
        /// Low half
        low: String,

        /// High half
        high: String,

        /// Print as hex instead of decimal
        #[arg(long)]
        hex: bool,
    },
}

fn parse_words(words: &[String]) -> anyhow::Result<Vec<Felt>> {
    words
        .iter()
        .map(|w| w.parse::<Felt>().map_err(anyhow::Error::from))
        .collect()
}

pub fn handle(action: &DecodeCommands, quiet: bool) -> anyhow::Result<()> {
    match action {
        DecodeCommands::ByteArray { words } => {
            let words = parse_words(words)?;
            let mut cursor = FeltCursor::new(&words);
            let decoded = decode_byte_array(&mut cursor)?;

            for fragment in &decoded.lossy {
                eprintln!("warning: {}", fragment);
            }
            if !cursor.is_exhausted() && !quiet {
                eprintln!(
                    "warning: {} trailing word(s) after the ByteArray",
                    cursor.remaining()
                );
            }

            println!("{}", decoded.text);
        }

        DecodeCommands::U256 { low, high, hex } => {
            let value = decode_u256(low.parse()?, high.parse()?)?;
            if *hex {
                println!("{:#x}", value);
            } else {
                println!("{}", value);
            }
        }
    }

    Ok(())
}
