//! Test Transaction Generator
//!
//! Generates and publishes synthetic blockchain transactions to NATS for
//! pipeline testing. A configurable fraction of the stream carries
//! high-risk patterns (errors, dust, self transfers, round amounts).

use chainguard_engine::Transaction;
use rand::Rng;
use std::time::Duration;
use tracing::{info, warn};

struct TransactionGenerator {
    rng: rand::rngs::ThreadRng,
    counter: u64,
}

impl TransactionGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            counter: 0,
        }
    }

    fn random_address(&mut self) -> String {
        let mut address = String::with_capacity(42);
        address.push_str("0x");
        for _ in 0..40 {
            let nibble = self.rng.gen_range(0..16u8);
            address.push(char::from_digit(nibble as u32, 16).unwrap_or('0'));
        }
        address
    }

    fn next_hash(&mut self) -> String {
        self.counter += 1;
        format!("0x{:016x}{:016x}", self.counter, self.rng.gen::<u64>())
    }

    /// An ordinary transfer: small non-round amount, no error.
    fn generate_legitimate(&mut self) -> Transaction {
        let hash = self.next_hash();
        let from = self.random_address();
        let to = self.random_address();
        Transaction::new(hash, from, to)
            .with_value(self.rng.gen_range(0.01..0.9))
            .with_timestamp(chrono::Utc::now().timestamp())
    }

    /// A transaction built to trip the risk rules.
    fn generate_suspicious(&mut self) -> Transaction {
        let hash = self.next_hash();
        let from = self.random_address();

        match self.rng.gen_range(0..4u8) {
            // Failed large transfer
            0 => Transaction::new(hash, from, self.random_address())
                .with_value(self.rng.gen_range(11.0..500.0))
                .with_error(true),
            // Dust spray
            1 => Transaction::new(hash, from, self.random_address())
                .with_value(self.rng.gen_range(0.000001..0.0009))
                .with_error(self.rng.gen_bool(0.5)),
            // Self transfer
            2 => {
                let to = from.clone();
                Transaction::new(hash, from, to).with_value(self.rng.gen_range(0.0..5.0))
            }
            // Round bot-like amount
            _ => {
                let multiple = self.rng.gen_range(1..50u32);
                Transaction::new(hash, from, self.random_address())
                    .with_value(multiple as f64 * 10.0)
            }
        }
        .with_timestamp(chrono::Utc::now().timestamp())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tx_generator=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let nats_url = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("nats://localhost:4222");
    let subject = args
        .get(2)
        .map(|s| s.as_str())
        .unwrap_or("chain.transactions");
    let count: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(100);
    let risky_rate: f64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0.1);
    let delay_ms: u64 = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(100);

    info!(
        nats_url = %nats_url,
        subject = %subject,
        count,
        risky_rate,
        delay_ms,
        "Starting transaction generator"
    );

    let client = match async_nats::connect(nats_url).await {
        Ok(client) => {
            info!("Connected to NATS");
            client
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to NATS; running in dry-run mode");
            return run_dry_mode(count, risky_rate, delay_ms).await;
        }
    };

    let mut generator = TransactionGenerator::new();
    let mut rng = rand::thread_rng();
    let mut risky = 0u64;

    for i in 0..count {
        let tx = if rng.gen_bool(risky_rate) {
            risky += 1;
            generator.generate_suspicious()
        } else {
            generator.generate_legitimate()
        };

        let payload = serde_json::to_vec(&tx)?;
        client.publish(subject.to_string(), payload.into()).await?;

        if (i + 1) % 10 == 0 {
            info!("Published {}/{} transactions ({} risky)", i + 1, count, risky);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    info!("Completed! Published {} transactions ({} risky)", count, risky);
    Ok(())
}

async fn run_dry_mode(count: u64, risky_rate: f64, delay_ms: u64) -> anyhow::Result<()> {
    let mut generator = TransactionGenerator::new();
    let mut rng = rand::thread_rng();

    for i in 0..count {
        let tx = if rng.gen_bool(risky_rate) {
            generator.generate_suspicious()
        } else {
            generator.generate_legitimate()
        };

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample transaction {}:\n{}", i + 1, serde_json::to_string_pretty(&tx)?);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
