use std::io;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use time::OffsetDateTime;

use crate::config::EffectiveConfig;
use crate::controller::{PresentationController, Resolution};
use crate::core::{CheckFailure, ScanReport};
use crate::logs::{CheckLogStatus, CheckRun};
use crate::transport::{FileTransport, HttpTransport, Transport};
use crate::ui::UiConfig;
use crate::view::{MountError, Scene};

#[derive(Debug, Parser)]
#[command(
    name = "sitescore",
    version,
    about = "Submit a site to the security analysis service and render its score, categories and checks"
)]
pub struct Cli {
    #[arg(long, global = true)]
    pub json: bool,
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
    #[arg(long, global = true)]
    pub verbose: bool,
    #[arg(long, global = true)]
    pub quiet: bool,
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Analysis endpoint, e.g. http://127.0.0.1:5000/api/check
    #[arg(long, global = true)]
    pub endpoint: Option<String>,
    /// Request timeout in seconds.
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check one site against the analysis endpoint.
    Check(CheckArgs),
    /// Render a payload saved from the analysis endpoint.
    Render(RenderArgs),
    /// Interactive terminal UI.
    Ui(UiArgs),
    Completion(CompletionArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    pub url: String,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct UiArgs {}

#[derive(Debug, Args)]
pub struct CompletionArgs {
    pub shell: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[arg(long)]
    pub show: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let stdin_is_tty = io::stdin().is_terminal();
    let stdout_is_tty = io::stdout().is_terminal();
    let stderr_is_tty = io::stderr().is_terminal();

    let home_dir = crate::platform::effective_home_dir()?;

    let mut cfg =
        crate::config::load(cli.config.as_deref(), &home_dir).map_err(crate::exit::invalid_args_err)?;
    apply_cli_overrides(&mut cfg, &cli);
    crate::config::validate(&cfg).map_err(crate::exit::invalid_args_err)?;

    let ui_cfg = UiConfig {
        color: stdout_is_tty && cfg.ui.color && !cli.no_color,
        stdin_is_tty,
        stdout_is_tty,
        stderr_is_tty,
        quiet: cli.quiet,
        verbose: cli.verbose,
    };

    match &cli.command {
        Commands::Check(args) => {
            let transport = HttpTransport::new(cfg.endpoint.url.clone(), cfg.endpoint.timeout())?;
            let run = CheckCommand {
                name: "check",
                url: &args.url,
                json: cli.json,
                cfg: &cfg,
                ui: &ui_cfg,
                home_dir: &home_dir,
            };
            run.execute(&transport)?;
        }
        Commands::Render(args) => {
            let transport =
                FileTransport::open(&args.file).map_err(crate::exit::invalid_args_err)?;
            let url = transport
                .recorded_url()
                .unwrap_or_else(|| transport.path().display().to_string());
            let run = CheckCommand {
                name: "render",
                url: &url,
                json: cli.json,
                cfg: &cfg,
                ui: &ui_cfg,
                home_dir: &home_dir,
            };
            run.execute(&transport)?;
        }
        Commands::Ui(_args) => {
            if cli.json {
                return Err(crate::exit::invalid_args("ui cannot be combined with --json"));
            }
            if !(ui_cfg.stdin_is_tty && ui_cfg.stdout_is_tty) {
                return Err(crate::exit::invalid_args(
                    "ui needs a terminal (stdin + stdout)",
                ));
            }
            let transport = HttpTransport::new(cfg.endpoint.url.clone(), cfg.endpoint.timeout())?;
            crate::tui::run(transport, ui_cfg.color, cfg.ui.animate)?;
        }
        Commands::Completion(args) => {
            let shell = parse_shell(&args.shell)?;
            let mut cmd = Cli::command();
            let mut out = std::io::stdout().lock();
            clap_complete::generate(shell, &mut cmd, "sitescore", &mut out);
        }
        Commands::Config(args) => {
            if args.show {
                if cli.json {
                    write_json(&cfg)?;
                } else {
                    println!("{}", toml::to_string_pretty(&cfg)?);
                }
            } else if !ui_cfg.quiet {
                eprintln!("config: use `sitescore config --show`");
            }
        }
    }

    Ok(())
}

fn apply_cli_overrides(cfg: &mut EffectiveConfig, cli: &Cli) {
    if let Some(endpoint) = &cli.endpoint {
        cfg.endpoint.url = endpoint.trim().to_string();
    }
    if let Some(timeout) = cli.timeout {
        cfg.endpoint.timeout_secs = timeout;
    }
    if cli.no_color {
        cfg.ui.color = false;
    }
}

/// One submission through a transport, rendered once it settles.
struct CheckCommand<'a> {
    name: &'static str,
    url: &'a str,
    json: bool,
    cfg: &'a EffectiveConfig,
    ui: &'a UiConfig,
    home_dir: &'a std::path::Path,
}

impl CheckCommand<'_> {
    fn execute(&self, transport: &dyn Transport) -> Result<()> {
        let started_at = OffsetDateTime::now_utc();
        let mut ctl = PresentationController::new(Scene::new());

        let submission = ctl
            .submit(self.url)
            .map_err(|e| crate::exit::invalid_args(e.user_message()))?;

        let pb = if self.ui.stderr_is_tty && !self.ui.quiet && !self.json {
            let pb = indicatif::ProgressBar::new_spinner();
            pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
            pb.set_message(format!("Checking {}...", submission.url));
            pb.enable_steady_tick(Duration::from_millis(120));
            Some(pb)
        } else {
            None
        };
        let outcome = transport.check(&submission.url);
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        let report = outcome.as_ref().ok().cloned();
        let failure = outcome.as_ref().err().cloned();

        let mut render_errors = ctl.take_render_errors();
        let stale = match ctl.resolve(submission.ticket, outcome) {
            Resolution::Applied {
                render_errors: errors,
            } => {
                render_errors.extend(errors);
                false
            }
            Resolution::Stale => true,
        };

        if !stale && report.is_some() && !self.json {
            self.animate(&mut ctl);
        }
        ctl.finish_animation();
        render_errors.extend(ctl.take_render_errors());

        if self.ui.verbose {
            if stale {
                eprintln!("stale response for {} dropped", submission.url);
            }
            for err in &render_errors {
                eprintln!("render: {err}");
            }
        }

        self.write_log(
            &submission.url,
            started_at,
            stale,
            report.as_ref(),
            failure.as_ref(),
            &render_errors,
        );

        if let Some(failure) = failure {
            return Err(crate::exit::from_failure(&failure));
        }
        if let Some(report) = report {
            if self.json {
                write_json(&report)?;
            } else {
                crate::ui::print_scene(ctl.view(), self.ui);
            }
        }
        Ok(())
    }

    fn animate(&self, ctl: &mut PresentationController<Scene>) {
        if !(self.cfg.ui.animate && self.ui.stdout_is_tty && !self.ui.quiet) {
            return;
        }
        while let Some(due) = ctl.next_tick_due() {
            let now = Instant::now();
            if due > now {
                std::thread::sleep(due - now);
            }
            ctl.on_tick(Instant::now());
            if let Some(value) = ctl.view().score_readout {
                crate::ui::print_readout_frame(value);
            }
        }
        crate::ui::clear_readout_line();
    }

    fn write_log(
        &self,
        url: &str,
        started_at: OffsetDateTime,
        stale: bool,
        report: Option<&ScanReport>,
        failure: Option<&CheckFailure>,
        render_errors: &[MountError],
    ) {
        if !self.cfg.logs.enabled {
            return;
        }
        let status = match (stale, failure) {
            (true, _) => CheckLogStatus::Stale,
            (false, Some(f)) => CheckLogStatus::from_failure(f),
            (false, None) => CheckLogStatus::Ok,
        };
        let run = CheckRun {
            command: self.name,
            url,
            started_at,
            finished_at: OffsetDateTime::now_utc(),
            status,
            percentage: report.map(|r| r.percentage),
            level: report.map(|r| r.level),
            failure,
            render_errors,
        };
        match crate::logs::write_check_log(self.home_dir, &run) {
            Ok(path) => {
                if self.ui.verbose {
                    eprintln!("log: {}", path.display());
                }
            }
            Err(err) => {
                if !self.ui.quiet {
                    eprintln!("warning: {err:#}");
                }
            }
        }
    }
}

fn write_json<T: serde::Serialize>(value: &T) -> Result<()> {
    use std::io::Write;

    let buf = serde_json::to_vec_pretty(value)?;

    let mut stdout = std::io::stdout().lock();
    match stdout.write_all(&buf) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => return Ok(()),
        Err(err) => return Err(err.into()),
    }
    match stdout.write_all(b"\n") {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn parse_shell(s: &str) -> Result<clap_complete::Shell> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "bash" => Ok(clap_complete::Shell::Bash),
        "zsh" => Ok(clap_complete::Shell::Zsh),
        "fish" => Ok(clap_complete::Shell::Fish),
        other => Err(crate::exit::invalid_args(format!(
            "unsupported shell: {other} (expected bash|zsh|fish)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_override_config() {
        let cli = Cli::parse_from([
            "sitescore",
            "--endpoint",
            " https://scan.example/api/check ",
            "--timeout",
            "7",
            "--no-color",
            "check",
            "example.com",
        ]);
        let mut cfg = EffectiveConfig::default();
        apply_cli_overrides(&mut cfg, &cli);
        assert_eq!(cfg.endpoint.url, "https://scan.example/api/check");
        assert_eq!(cfg.endpoint.timeout_secs, 7);
        assert!(!cfg.ui.color);
        assert!(matches!(cli.command, Commands::Check(ref a) if a.url == "example.com"));
    }

    #[test]
    fn missing_flags_leave_config_alone() {
        let cli = Cli::parse_from(["sitescore", "render", "payload.json"]);
        let mut cfg = EffectiveConfig::default();
        apply_cli_overrides(&mut cfg, &cli);
        assert_eq!(cfg, EffectiveConfig::default());
    }

    #[test]
    fn parse_shell_rejects_unknown() {
        assert!(matches!(parse_shell(" Zsh "), Ok(clap_complete::Shell::Zsh)));
        let err = parse_shell("tcsh").expect_err("unsupported");
        assert_eq!(crate::exit::exit_code(&err), 2);
    }
}
