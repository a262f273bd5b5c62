use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use immersive_core::config;
use immersive_core::ipc::{self, DaemonMsg, HostMsg};
use immersive_core::surface::Rect;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;

#[derive(Parser)]
#[command(name = "immersivectl", about = "Control the immersived daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show daemon status
    Status,
    /// Turn immersive mode on
    Enable,
    /// Turn immersive mode off
    Disable,
    /// Keep the UI shown until unpinned
    Pin,
    /// Release a pin and let the UI auto-hide
    Unpin,
    /// Reveal the UI now
    Reveal,
    /// Hide the UI now
    Hide,
    /// Report the host mode (e.g. fullscreen) as entered or left
    HostMode {
        #[arg(action = clap::ArgAction::Set)]
        active: bool,
    },
    /// Report a pointer position in window coordinates
    Pointer { x: i32, y: i32 },
    /// Report that an input surface gained focus
    Focus,
    /// Report that an input surface lost focus
    Blur,
    /// Report keyboard activity
    Key,
    /// Report that the focused context (e.g. active tab) changed
    ContextChanged,
    /// Set the host window bounds used for the hover zone
    Bounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    /// Set the legacy "always show toolbar" condition
    Legacy {
        #[arg(action = clap::ArgAction::Set)]
        active: bool,
    },
    /// Reload the daemon's config file
    Reload,
    /// Subscribe and print surface commands and notifications
    Watch,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let socket_path = config::socket_path();
    let stream = UnixStream::connect(&socket_path).with_context(|| {
        format!(
            "connecting to immersived at {}\nIs the daemon running?",
            socket_path.display()
        )
    })?;

    let mut writer = stream.try_clone().context("cloning stream")?;
    let reader = BufReader::new(stream);

    let msg: HostMsg = match cli.command {
        Command::Status => HostMsg::GetStatus,
        Command::Enable => HostMsg::Enable,
        Command::Disable => HostMsg::Disable,
        Command::Pin => HostMsg::Pin,
        Command::Unpin => HostMsg::Unpin,
        Command::Reveal => HostMsg::Reveal,
        Command::Hide => HostMsg::Hide,
        Command::HostMode { active } => HostMsg::HostMode { active },
        Command::Pointer { x, y } => HostMsg::PointerMoved { x, y },
        Command::Focus => HostMsg::FocusGained,
        Command::Blur => HostMsg::FocusLost,
        Command::Key => HostMsg::KeyActivity,
        Command::ContextChanged => HostMsg::FocusedContextChanged,
        Command::Bounds {
            x,
            y,
            width,
            height,
        } => HostMsg::SetWindowBounds {
            bounds: Rect::new(x, y, width, height),
        },
        Command::Legacy { active } => HostMsg::SetLegacyAlwaysShow { active },
        Command::Reload => HostMsg::ReloadConfig,
        Command::Watch => HostMsg::Subscribe,
    };

    let watching = matches!(msg, HostMsg::Subscribe);
    let expects_reply = !matches!(msg, HostMsg::PointerMoved { .. });

    let line = ipc::encode(&msg);
    writer
        .write_all(line.as_bytes())
        .context("sending command")?;

    if !expects_reply {
        return Ok(());
    }

    // Read response
    for line in reader.lines() {
        let line = line.context("reading response")?;
        let Some(resp) = ipc::decode_daemon(&line) else {
            continue;
        };
        if watching {
            print_event(&resp);
            continue;
        }
        match resp {
            DaemonMsg::Status {
                mode,
                visible,
                hovering,
                version,
            } => {
                println!("immersived v{}", version);
                println!("  mode:     {}", mode);
                println!("  visible:  {}", visible);
                println!("  hovering: {}", hovering);
            }
            DaemonMsg::Ack { ok, message } => {
                if ok {
                    println!("{}", message);
                } else {
                    eprintln!("error: {}", message);
                    std::process::exit(1);
                }
            }
            _ => continue,
        }
        break;
    }

    Ok(())
}

fn print_event(msg: &DaemonMsg) {
    match msg {
        DaemonMsg::SetVisible { surface, visible } => {
            println!("{:<12} {}", surface, if *visible { "shown" } else { "hidden" });
        }
        DaemonMsg::VisibilityChanged { visible } => println!("ui visible: {}", visible),
        DaemonMsg::ModeToggled { enabled } => println!("immersive mode: {}", enabled),
        DaemonMsg::HoverChanged { hovering } => println!("hover zone: {}", hovering),
        DaemonMsg::Ack { message, .. } => println!("{}", message),
        DaemonMsg::Status { .. } => {}
    }
}
