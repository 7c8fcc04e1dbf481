//! 连接演示程序
//!
//! 连到指定编号的控制器，打印链路事件，Ctrl-C 退出。
//!
//! ```bash
//! RUST_LOG=info cargo run --bin connect -- --team 178 --mode Teleoperated
//! ```

use clap::Parser;
use crossbeam_channel::bounded;
use frcds_link::{LinkConfig, LinkController, LinkEvent};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Driver station link demo for legacy FRC controllers")]
struct Args {
    /// 队伍/设备编号（1-9999）
    #[arg(long)]
    team: u16,

    /// 初始模式（Disabled/Teleoperated/Autonomous/Test）
    #[arg(long, default_value = "Teleoperated")]
    mode: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let link = LinkController::start(LinkConfig::new(args.team))?;
    link.set_mode_by_name(&args.mode)?;

    let events = link.subscribe();
    std::thread::spawn(move || {
        for event in events {
            match event {
                LinkEvent::Connected => info!("connected"),
                LinkEvent::Disconnected => info!("disconnected"),
                LinkEvent::ConnectTimeout(err) => info!("{err}, searching"),
                LinkEvent::Telemetry(t) => info!(
                    battery = t.battery_voltage(),
                    has_robot_code = t.has_robot_code,
                    "telemetry"
                ),
            }
        }
    });

    let (ctrlc_tx, ctrlc_rx) = bounded(1);
    ctrlc::set_handler(move || {
        let _ = ctrlc_tx.send(());
    })?;
    ctrlc_rx.recv()?;

    link.stop();
    Ok(())
}
