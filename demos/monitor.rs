//! Connect to a mixer and log connection status, state changes and the
//! raw message traffic.
//!
//! Usage: `cargo run --example monitor -- 192.168.1.123`

use futures_util::StreamExt;
use soundcraft_ui::{FadeableChannel, MuteableChannel, SoundcraftUi};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let target_ip = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "10.10.1.1".to_string());

    let mixer = SoundcraftUi::with_target_ip(&target_ip);

    // log every status change
    let mut status = mixer.status_events();
    tokio::spawn(async move {
        while let Ok(event) = status.recv().await {
            println!("status: {event:?}");
        }
    });

    println!("connecting to {target_ip} ...");
    mixer.connect().await?;
    println!("connected, model: {:?}", mixer.device_info().current_model());

    // follow input 1 on the master bus
    let channel = mixer.master().input(1);
    let mut name = channel.name();
    if let Some(name) = name.next().await {
        println!("input 1 is labeled {name:?}");
    }

    let mut levels = channel.fader_level_db();
    let mut mutes = channel.mute();
    loop {
        tokio::select! {
            Some(db) = levels.next() => println!("input 1 fader: {db:.1} dB"),
            Some(muted) = mutes.next() => println!("input 1 muted: {muted}"),
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    mixer.disconnect().await?;
    Ok(())
}
