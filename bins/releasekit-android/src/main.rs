//! releasekit Android CLI
//!
//! Release signing checks and release builds for Flutter Android projects.

use anyhow::Result;
use clap::{Parser, Subcommand};
use owo_colors::{OwoColorize, Stream};
use releasekit_android::build_config::{ReleaseBuildConfig, SigningDecision, SigningPolicy};
use releasekit_android::gradle::{self, ArtifactKind};
use releasekit_android::local_properties::LocalProperties;
use releasekit_android::project::AndroidProject;
use releasekit_android::signing::{self, ConfigurationMissing, MissingReason, SigningProfile};
use releasekit_cli::output::{self, Status};
use releasekit_core::config::Config;
use releasekit_core::error::{exit_codes, Error, ErrorCode};
use releasekit_core::process::{run_command_in_dir, which_command};
use serde::Serialize;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "releasekit-android")]
#[command(about = "Release signing and build tools for Flutter Android projects")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Project directory (Flutter root or Android root)
    #[arg(short, long, global = true, default_value = ".")]
    project: PathBuf,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the release signing configuration
    Signing {
        #[command(subcommand)]
        action: SigningAction,
    },

    /// Show SDK locations and app version from local.properties
    Local {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build a release artifact
    Build {
        /// Build bundle (AAB) instead of APK
        #[arg(long)]
        bundle: bool,
        /// Build unsigned when key.properties is missing
        #[arg(long)]
        allow_unsigned: bool,
        /// Refuse to build with an incomplete signing profile
        #[arg(long)]
        require_signing: bool,
        /// Clean before building
        #[arg(long)]
        clean: bool,
        /// Resolve and report without running Gradle
        #[arg(long)]
        dry_run: bool,
    },

    /// Diagnose the release environment
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SigningAction {
    /// Resolve and print the signing profile
    Resolve {
        /// Signing properties file (defaults to android/key.properties)
        #[arg(long)]
        file: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report missing keys and a missing keystore
    Check {
        /// Signing properties file (defaults to android/key.properties)
        #[arg(long)]
        file: Option<PathBuf>,
        /// Fail when the profile is incomplete
        #[arg(long)]
        require: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    init_logging(cli.verbose, cli.quiet, cli.no_color);

    let config = Config::load_from(cli.config.as_deref(), &cli.project)?;

    let exit_code = match cli.command {
        Commands::Signing { action } => match action {
            SigningAction::Resolve { file, json } => {
                run_signing_resolve(&cli.project, file.as_deref(), json, &config)
            }
            SigningAction::Check { file, require } => {
                run_signing_check(&cli.project, file.as_deref(), require, &config)
            }
        },
        Commands::Local { json } => run_local(&cli.project, json, &config),
        Commands::Build {
            bundle,
            allow_unsigned,
            require_signing,
            clean,
            dry_run,
        } => {
            let policy = SigningPolicy {
                require_signing: require_signing || config.schema.signing.require_signing,
                allow_unsigned: allow_unsigned || config.schema.signing.allow_unsigned,
            };
            let kind = if bundle {
                ArtifactKind::Bundle
            } else {
                ArtifactKind::Apk
            };
            run_build(&cli.project, kind, policy, clean, dry_run, &config)
        }
        Commands::Doctor { json } => run_doctor(&cli.project, json, &config),
    };

    std::process::exit(exit_code);
}

/// Logs go to stderr; `RUST_LOG` overrides the verbosity flags
fn init_logging(verbose: u8, quiet: bool, no_color: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!no_color && std::io::stderr().is_terminal())
        .with_target(false)
        .compact()
        .init();
}

/// Locate the project, or build a layout around an explicit properties file
fn locate(project_dir: &Path, file: Option<&Path>, config: &Config) -> Result<AndroidProject, Error> {
    match file {
        Some(file) => {
            let root = file
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            Ok(AndroidProject::with_layout(root, &config.schema.android).with_key_properties(file))
        }
        None => AndroidProject::discover(project_dir, &config.schema.android),
    }
}

fn report_missing(missing: &ConfigurationMissing) {
    let file_name = missing.file_name();
    let dir = missing
        .path
        .parent()
        .map(|parent| parent.display().to_string())
        .filter(|parent| !parent.is_empty())
        .unwrap_or_else(|| ".".to_string());

    let message = match &missing.reason {
        MissingReason::NotFound => {
            format!("ERROR: {} file not found in {}/ directory.", file_name, dir)
        }
        MissingReason::Unreadable(err) => format!(
            "ERROR: {} file in {}/ directory could not be read: {}",
            file_name, dir, err
        ),
    };
    Status::error(&message);
}

fn profile_fields(profile: &SigningProfile, app_dir: &Path) -> Vec<(&'static str, Option<String>)> {
    let keystore = profile.keystore_path(app_dir).map(|path| {
        if path.is_file() {
            path.display().to_string()
        } else {
            format!("{} (missing)", path.display())
        }
    });

    vec![
        (signing::STORE_FILE, profile.store_file.clone()),
        ("keystore", keystore),
        (
            signing::STORE_PASSWORD,
            profile.store_password.as_ref().map(ToString::to_string),
        ),
        (signing::KEY_ALIAS, profile.key_alias.clone()),
        (
            signing::KEY_PASSWORD,
            profile.key_password.as_ref().map(ToString::to_string),
        ),
    ]
}

fn run_signing_resolve(project_dir: &Path, file: Option<&Path>, json: bool, config: &Config) -> i32 {
    let project = match locate(project_dir, file, config) {
        Ok(project) => project,
        Err(e) => return fail(&e),
    };

    match signing::resolve(project.key_properties()) {
        Ok(profile) => {
            if json {
                if let Err(e) = output::print_json(&profile) {
                    return fail(&Error::from(e));
                }
            } else {
                Status::success(&format!(
                    "Resolved signing profile from {}",
                    project.key_properties().display()
                ));
                output::print_fields(&profile_fields(&profile, project.app_dir()));
            }
            exit_codes::SUCCESS
        }
        Err(missing) if json => {
            let err = Error::from(missing);
            match output::print_json(&err.to_report()) {
                Ok(()) => err.code.exit_code(),
                Err(e) => fail(&Error::from(e)),
            }
        }
        Err(missing) => {
            report_missing(&missing);
            fail(&Error::from(missing))
        }
    }
}

fn run_signing_check(project_dir: &Path, file: Option<&Path>, require: bool, config: &Config) -> i32 {
    let require = require || config.schema.signing.require_signing;

    let project = match locate(project_dir, file, config) {
        Ok(project) => project,
        Err(e) => return fail(&e),
    };

    let profile = match signing::resolve(project.key_properties()) {
        Ok(profile) => profile,
        Err(missing) => {
            report_missing(&missing);
            return fail(&Error::from(missing));
        }
    };

    let mut problems: Vec<Error> = Vec::new();

    let missing = profile.missing_keys();
    if missing.is_empty() {
        Status::success("All signing keys present");
    } else {
        Status::warning(&format!(
            "{} without a value: {}",
            output::format_count(missing.len(), "key", "keys"),
            missing.join(", ")
        ));
        problems.push(Error::incomplete_signing(&missing));
    }

    match profile.keystore_path(project.app_dir()) {
        Some(path) if path.is_file() => {
            Status::success(&format!("Keystore found: {}", path.display()));
        }
        Some(path) => {
            Status::warning(&format!("Keystore not found: {}", path.display()));
            problems.push(
                Error::new(
                    ErrorCode::KeystoreNotFound,
                    format!("Keystore not found: {}", path.display()),
                )
                .with_suggestion("storeFile is resolved relative to the app module directory"),
            );
        }
        None => {}
    }

    match problems.first() {
        Some(first) if require => fail(first),
        Some(_) => {
            Status::info("Signing problems will surface when Gradle signs the release");
            exit_codes::SUCCESS
        }
        None => exit_codes::SUCCESS,
    }
}

fn run_local(project_dir: &Path, json: bool, config: &Config) -> i32 {
    let project = match AndroidProject::discover(project_dir, &config.schema.android) {
        Ok(project) => project,
        Err(e) => return fail(&e),
    };

    let local = match LocalProperties::load(project.local_properties()) {
        Ok(Some(local)) => local,
        Ok(None) => {
            Status::warning(&format!(
                "No local.properties at {}",
                project.local_properties().display()
            ));
            return exit_codes::SUCCESS;
        }
        Err(e) => return fail(&e),
    };

    if json {
        if let Err(e) = output::print_json(&local) {
            return fail(&Error::from(e));
        }
        return exit_codes::SUCCESS;
    }

    let path_value = |path: &Option<PathBuf>| path.as_ref().map(|p| p.display().to_string());
    output::print_fields(&[
        ("sdk.dir", path_value(&local.sdk_dir)),
        ("flutter.sdk", path_value(&local.flutter_sdk)),
        ("version", Some(local.effective_version_name().to_string())),
        ("build", Some(local.effective_version_code().to_string())),
        ("mode", local.build_mode.clone()),
    ]);
    exit_codes::SUCCESS
}

fn run_build(
    project_dir: &Path,
    kind: ArtifactKind,
    policy: SigningPolicy,
    clean: bool,
    dry_run: bool,
    config: &Config,
) -> i32 {
    let project = match AndroidProject::discover(project_dir, &config.schema.android) {
        Ok(project) => project,
        Err(e) => return fail(&e),
    };

    let resolution = signing::resolve(project.key_properties());
    if let Err(missing) = &resolution {
        report_missing(missing);
    }

    let release = match policy.decide(resolution) {
        SigningDecision::Signed(profile) => ReleaseBuildConfig::new(Some(profile)),
        SigningDecision::Unsigned => {
            Status::warning("Building an unsigned release artifact");
            ReleaseBuildConfig::new(None)
        }
        SigningDecision::Blocked(reason) => {
            tracing::info!(%reason, "release build blocked");
            return fail(&reason.to_error());
        }
    };

    if let Err(e) = release.validate() {
        return fail(&e);
    }

    let version = match LocalProperties::load(project.local_properties()) {
        Ok(local) => local.unwrap_or_default(),
        Err(e) => return fail(&e),
    };

    Status::header(&format!("Release {}", kind.label()));
    output::print_fields(&[
        (
            "version",
            Some(format!(
                "{} ({})",
                version.effective_version_name(),
                version.effective_version_code()
            )),
        ),
        (
            "signing",
            Some(if release.is_signed() { "signed" } else { "unsigned" }.to_string()),
        ),
        ("minify", Some(release.minify_enabled.to_string())),
        ("shrink resources", Some(release.shrink_resources.to_string())),
        (
            "java",
            Some(release.compile_options.target_compatibility.to_string()),
        ),
    ]);

    if dry_run {
        Status::info("Dry run, Gradle not invoked");
        return exit_codes::SUCCESS;
    }

    if clean {
        Status::info("Cleaning...");
        if let Err(e) = gradle::clean(&project) {
            return fail(&e);
        }
    }

    Status::info(&format!("Running {}...", kind.release_task()));

    match gradle::build_release(&project, kind, release.signing.as_ref()) {
        Ok(()) => {
            Status::success("Release build succeeded");
            exit_codes::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

#[derive(Serialize)]
struct DoctorCheck {
    name: &'static str,
    ok: bool,
    detail: String,
}

fn run_doctor(project_dir: &Path, json: bool, config: &Config) -> i32 {
    let project = match AndroidProject::discover(project_dir, &config.schema.android) {
        Ok(project) => project,
        Err(e) => return fail(&e),
    };

    let file_check = |name: &'static str, path: &Path| DoctorCheck {
        name,
        ok: path.is_file(),
        detail: path.display().to_string(),
    };

    let mut checks = vec![
        file_check("gradle wrapper", &project.gradle_wrapper()),
        file_check("key.properties", project.key_properties()),
        file_check("local.properties", project.local_properties()),
    ];

    if let Ok(profile) = signing::resolve(project.key_properties()) {
        match profile.keystore_path(project.app_dir()) {
            Some(path) => checks.push(file_check("keystore", &path)),
            None => checks.push(DoctorCheck {
                name: "keystore",
                ok: false,
                detail: format!("{} is not set", signing::STORE_FILE),
            }),
        }
    }

    checks.push(java_check());

    if json {
        if let Err(e) = output::print_json(&checks) {
            return fail(&Error::from(e));
        }
        return exit_codes::SUCCESS;
    }

    println!(
        "{}",
        "Environment Check".if_supports_color(Stream::Stdout, |text| text.bold())
    );
    println!();
    for check in &checks {
        let line = format!("{}: {}", check.name, check.detail);
        if check.ok {
            Status::success(&line);
        } else {
            Status::warning(&line);
        }
    }

    exit_codes::SUCCESS
}

/// `java -version` prints to stderr on most JDKs, stdout on some
fn java_check() -> DoctorCheck {
    let Some(java) = which_command("java") else {
        return DoctorCheck {
            name: "java",
            ok: false,
            detail: "java not found on PATH".to_string(),
        };
    };

    let program = java.to_string_lossy();
    match run_command_in_dir(&program, &["-version"], Path::new(".")) {
        Ok(result) => DoctorCheck {
            name: "java",
            ok: result.success,
            detail: result
                .combined_output()
                .lines()
                .next()
                .map(str::to_string)
                .unwrap_or_else(|| java.display().to_string()),
        },
        Err(e) => DoctorCheck {
            name: "java",
            ok: false,
            detail: e.message,
        },
    }
}

fn fail(err: &Error) -> i32 {
    output::print_error(err);
    err.code.exit_code()
}
