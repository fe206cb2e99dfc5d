//! Relay load check: several chat clients sending concurrently against a running gateway.
//! Run with the gateway up: cargo run --bin relay_load

use astrovision_core::chat::{FAILURE_FALLBACK, NO_RESPONSE_FALLBACK};
use astrovision_core::{AstroConfig, ChatRelay, HttpRelayTransport, SUGGESTIONS};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

const CONCURRENT_CLIENTS: usize = 8;
const MESSAGES_PER_CLIENT: usize = 4;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let config = AstroConfig::load()?;
    let relay_url = config.relay_url.clone();
    let timeout = config.http_timeout();

    println!(
        "[RELAY LOAD] {} clients x {} messages = {} sends against {}",
        CONCURRENT_CLIENTS,
        MESSAGES_PER_CLIENT,
        CONCURRENT_CLIENTS * MESSAGES_PER_CLIENT,
        relay_url
    );

    let answered = Arc::new(AtomicU32::new(0));
    let fallback = Arc::new(AtomicU32::new(0));
    let latencies: Arc<RwLock<Vec<u64>>> = Arc::new(RwLock::new(Vec::new()));

    let mut handles = Vec::new();
    for client_id in 0..CONCURRENT_CLIENTS {
        let relay = ChatRelay::new(HttpRelayTransport::new(relay_url.clone(), timeout));
        let answered = Arc::clone(&answered);
        let fallback = Arc::clone(&fallback);
        let latencies = Arc::clone(&latencies);

        handles.push(tokio::spawn(async move {
            for n in 0..MESSAGES_PER_CLIENT {
                let prompt = SUGGESTIONS[(client_id + n) % SUGGESTIONS.len()];
                let start = Instant::now();
                let Some(bot) = relay.send_message(prompt).await else {
                    continue;
                };
                let elapsed_ms = start.elapsed().as_millis() as u64;
                if bot.text == NO_RESPONSE_FALLBACK || bot.text == FAILURE_FALLBACK {
                    fallback.fetch_add(1, Ordering::Relaxed);
                } else {
                    answered.fetch_add(1, Ordering::Relaxed);
                    latencies.write().await.push(elapsed_ms);
                }
            }
            relay.len()
        }));
    }

    let mut turns = 0;
    for h in handles {
        turns += h.await.unwrap_or(0);
    }

    let a = answered.load(Ordering::Relaxed);
    let f = fallback.load(Ordering::Relaxed);
    let total = a + f;
    let answer_rate = if total > 0 { (a as f64 / total as f64) * 100.0 } else { 0.0 };
    let latencies = latencies.read().await;
    let avg_latency_ms = if latencies.is_empty() {
        0.0
    } else {
        latencies.iter().sum::<u64>() as f64 / latencies.len() as f64
    };

    println!(
        "[RELAY LOAD] Answered: {:.1}% | Average Latency: {:.0}ms",
        answer_rate, avg_latency_ms
    );
    println!(
        "[RELAY LOAD] Sends: {} | Answered: {} | Fallback: {} | Transcript turns: {}",
        total, a, f, turns
    );
    Ok(())
}
