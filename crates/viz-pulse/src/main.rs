use clap::Parser;
use crossbeam_channel::Receiver;
use std::ops::ControlFlow;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use viz_pulse::audio::{self, CaptureBackend, CpalBackend, Session};
use viz_pulse::cli;
use viz_pulse::ui::{self, bindings::{Action, HELP}};
use viz_pulse::utils::{self, Config};
use viz_pulse_api::ControlSignal;

fn main() {
    let args = cli::Args::parse();
    let mut config = Config::load();
    utils::init_logging(args.log_level.as_deref().unwrap_or(config.log_level()));

    if args.list_devices {
        audio::list_devices();
        return;
    }

    let tick_rate = args.tick_rate.unwrap_or(config.tick_rate_hz());
    let backend = CpalBackend::new(config.device_timeout());
    let mut session = Session::new(backend, config.session());

    if args.mic {
        apply(&mut session, &mut config, Action::StartMicrophone);
    } else if let Some(path) = args.file {
        apply(&mut session, &mut config, Action::StartFile(Some(path)));
    }

    println!("{}", HELP);
    let commands = ui::console::spawn_reader();
    info!(tick_rate, "analysis loop running");
    run(&mut session, &mut config, &commands, tick_rate);

    session.stop();
    info!("bye");
}

/// Tick at a fixed rate until a quit command arrives
fn run<B: CaptureBackend>(
    session: &mut Session<B>,
    config: &mut Config,
    commands: &Receiver<Action>,
    tick_rate: u32,
) {
    let period = Duration::from_secs_f64(1.0 / tick_rate.max(1) as f64);
    let report_every = config.report_interval_ticks();
    let mut produced: u64 = 0;
    let mut next = Instant::now();

    loop {
        while let Ok(action) = commands.try_recv() {
            if apply(session, config, action).is_break() {
                return;
            }
        }

        match session.tick() {
            Ok(Some(signal)) => {
                produced += 1;
                if report_every > 0 && produced % report_every == 0 {
                    report(&signal);
                }
            }
            Ok(None) => {}
            Err(e) => error!("{}", e),
        }

        // Only a file that actually decoded becomes the replay target
        if let Some(path) = session.playing_file() {
            config.set_last_file(path);
        }

        next += period;
        let now = Instant::now();
        if next > now {
            thread::sleep(next - now);
        } else {
            // Fell behind; don't try to catch up
            next = now;
        }
    }
}

fn apply<B: CaptureBackend>(
    session: &mut Session<B>,
    config: &mut Config,
    action: Action,
) -> ControlFlow<()> {
    match action {
        Action::Quit => return ControlFlow::Break(()),
        Action::ShowHelp => println!("{}", HELP),
        Action::ShowStatus => print_status(session),
        Action::StartMicrophone => {
            if let Err(e) = session.start_microphone() {
                error!("{}", e);
            }
        }
        Action::StartFile(path) => match path.or_else(|| config.last_file.clone()) {
            Some(path) => session.start_file(path),
            None => warn!("no file given and none played before"),
        },
        Action::Pause => {
            if let Err(e) = session.pause() {
                warn!("{}", e);
            }
        }
        Action::Resume => {
            if let Err(e) = session.resume() {
                warn!("{}", e);
            }
        }
        Action::Stop => session.stop(),
    }
    ControlFlow::Continue(())
}

fn print_status<B: CaptureBackend>(session: &Session<B>) {
    let status = session.status();
    match &status.file_name {
        Some(name) => println!("state: {} [{}]", status.state, name),
        None => println!("state: {}", status.state),
    }
    for (name, value, ceiling) in session.latest().levels() {
        println!("  {:<16} {:.3} / {:.2}", name, value, ceiling);
    }
}

fn report(signal: &ControlSignal) {
    info!(
        average = signal.average_frequency,
        bass = signal.bass,
        mid = signal.mid,
        treble = signal.treble,
        kick = signal.kick,
        snare = signal.snare,
        hihat = signal.hihat,
        impact = signal.impact,
        "signal"
    );
}
