use std::io::{self, Write};
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use mission_core::ActionDispatcher;
use tracing::{error, info, warn};

use super::bootstrap::AppWiring;
use super::input::{LinePump, StdinLinePump};

const HOST_COMMAND_PREFIX: char = ':';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameFlow {
    Continue,
    Exit,
}

pub(crate) fn run(mut app: AppWiring) -> ExitCode {
    let mut pump = match StdinLinePump::spawn() {
        Ok(pump) => pump,
        Err(err) => {
            error!(error = %err, "stdin_reader_spawn_failed");
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = io::stdout();
    if let Err(err) = write_prompt(&app, &mut stdout) {
        error!(error = %err, "stdout_write_failed");
        return ExitCode::FAILURE;
    }

    let fixed_dt = app.clock.fixed_dt();
    info!(fixed_dt_ms = fixed_dt.as_secs_f64() * 1_000.0, "loop_config");
    let mut last_frame_instant = Instant::now();
    loop {
        let now = Instant::now();
        let frame_dt = now.saturating_duration_since(last_frame_instant);
        last_frame_instant = now;

        if run_frame(&mut app, &mut pump, frame_dt, &mut stdout) == FrameFlow::Exit {
            break;
        }
        thread::sleep(fixed_dt);
    }

    info!(
        clock_ms = app.sim.clock_ms(),
        achievements = app.effects.unlocked().len(),
        "shutdown"
    );
    ExitCode::SUCCESS
}

/// One host frame: interpret queued lines, dispatch their actions, then run
/// however many fixed simulation ticks the elapsed time allows.
pub(crate) fn run_frame(
    app: &mut AppWiring,
    pump: &mut dyn LinePump,
    frame_dt: Duration,
    out: &mut dyn Write,
) -> FrameFlow {
    app.effects.set_now_ms(app.clock.now_ms());

    let mut lines = Vec::new();
    let input_open = pump.drain_pending_lines(&mut lines);
    for line in lines {
        match handle_line(app, &line, out) {
            Ok(FrameFlow::Continue) => {}
            Ok(FrameFlow::Exit) => return FrameFlow::Exit,
            Err(err) => {
                warn!(error = %err, "stdout_write_failed");
                return FrameFlow::Exit;
            }
        }
    }
    if !input_open {
        info!(reason = "input_closed", "shutdown_requested");
        return FrameFlow::Exit;
    }

    let plan = app.clock.advance(frame_dt);
    for _ in 0..plan.ticks_to_run {
        let now_ms = app.clock.next_tick_ms();
        app.effects.set_now_ms(now_ms);
        app.sim.tick(now_ms, &mut app.viewport);
    }
    if plan.dropped_backlog > Duration::ZERO {
        warn!(
            dropped_backlog_ms = plan.dropped_backlog.as_millis() as u64,
            "sim_clamp_triggered"
        );
    }

    if app.effects.take_alert_expired() {
        app.terminal.acknowledge_alert();
    }
    FrameFlow::Continue
}

fn handle_line(app: &mut AppWiring, line: &str, out: &mut dyn Write) -> io::Result<FrameFlow> {
    if let Some(host_command) = line.trim().strip_prefix(HOST_COMMAND_PREFIX) {
        return handle_host_command(app, host_command.trim(), out);
    }

    let result = app.terminal.submit(line);
    for output in &result.output {
        writeln!(out, "{output}")?;
    }
    ActionDispatcher::new(&mut app.sim, &mut app.viewport, &mut app.effects)
        .apply_all(result.actions);

    if !app.terminal.is_open() {
        info!(reason = "terminal_closed", "shutdown_requested");
        out.flush()?;
        return Ok(FrameFlow::Exit);
    }
    write_prompt(app, out)?;
    Ok(FrameFlow::Continue)
}

/// `:state` dumps the vehicle snapshot as JSON, `:history` lists interpreted
/// lines and `:quit` exits.
fn handle_host_command(
    app: &mut AppWiring,
    command: &str,
    out: &mut dyn Write,
) -> io::Result<FrameFlow> {
    match command {
        "quit" | "q" => {
            info!(reason = "host_quit", "shutdown_requested");
            return Ok(FrameFlow::Exit);
        }
        "state" => {
            let json = serde_json::to_string_pretty(&app.sim.snapshot())
                .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
            writeln!(out, "{json}")?;
        }
        "history" => {
            for (index, line) in app.terminal.history().enumerate() {
                writeln!(out, "{:>4}  {line}", index + 1)?;
            }
        }
        other => writeln!(out, "unknown host command: :{other}")?,
    }
    write_prompt(app, out)?;
    Ok(FrameFlow::Continue)
}

fn write_prompt(app: &AppWiring, out: &mut dyn Write) -> io::Result<()> {
    write!(out, "{}", app.terminal.prompt())?;
    out.flush()
}
