use crate::fs::{self as rfs, FsError};
use crate::systems::SystemDef;
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct CommandTemplate(String);

crate::impl_string_newtype!(CommandTemplate);

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Emulator not found at: {}", .0.display())]
    EmulatorNotFound(PathBuf),
    #[error("ROM file not found: {}", .0.display())]
    RomNotFound(PathBuf),
    #[error("No core mapping found for system: {0}")]
    NoCore(String),
    #[error("Core not found: {}", .0.display())]
    CoreNotFound(PathBuf),
    #[error("Invalid launch command: {0}")]
    InvalidCommand(String),
    #[error(transparent)]
    Spawn(#[from] std::io::Error),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmulatorConfig {
    pub retroarch: PathBuf,
    pub cores_dir: PathBuf,
    /// `so` on Linux, `dylib` on macOS.
    pub core_extension: String,
    pub fullscreen: bool,
    pub extra_args: Vec<String>,
    /// Per-system command overrides, e.g. `"pc" = "dosbox {rom}"`.
    pub commands: BTreeMap<String, CommandTemplate>,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        let cores_dir = directories::BaseDirs::new()
            .map(|d| d.config_dir().join("retroarch").join("cores"))
            .unwrap_or_else(|| PathBuf::from("/usr/lib/libretro"));

        Self {
            retroarch: PathBuf::from("/usr/bin/retroarch"),
            cores_dir,
            core_extension: "so".to_string(),
            fullscreen: true,
            extra_args: Vec::new(),
            commands: BTreeMap::new(),
        }
    }
}

/// A fully resolved command line, ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub program: PathBuf,
    pub args: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Launcher {
    config: EmulatorConfig,
}

impl Launcher {
    pub fn new(config: EmulatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    pub fn core_path(&self, system: &SystemDef) -> PathBuf {
        self.config.cores_dir.join(format!(
            "{}_libretro.{}",
            system.core, self.config.core_extension
        ))
    }

    /// Validates everything a launch needs without spawning anything.
    pub fn plan(&self, system: &SystemDef, rom: &Path) -> Result<LaunchPlan, LaunchError> {
        if !rfs::path_exists(rom) {
            return Err(LaunchError::RomNotFound(rom.to_path_buf()));
        }

        if let Some(template) = self.config.commands.get(system.id) {
            return plan_from_template(template, rom, &self.core_path(system));
        }

        if !rfs::path_exists(&self.config.retroarch) {
            return Err(LaunchError::EmulatorNotFound(self.config.retroarch.clone()));
        }
        if system.core.is_empty() {
            return Err(LaunchError::NoCore(system.id.to_string()));
        }

        let core = self.core_path(system);
        if !rfs::path_exists(&core) {
            return Err(LaunchError::CoreNotFound(core));
        }

        let mut args = vec![
            "-L".to_string(),
            core.to_string_lossy().into_owned(),
            rom.to_string_lossy().into_owned(),
        ];
        if self.config.fullscreen {
            args.push("--fullscreen".to_string());
        }
        args.extend(self.config.extra_args.iter().cloned());

        Ok(LaunchPlan {
            program: self.config.retroarch.clone(),
            args,
        })
    }

    pub fn launch_game(&self, system: &SystemDef, rom: &Path) -> Result<LaunchPlan, LaunchError> {
        let plan = self.plan(system, rom)?;
        log::info!(
            "Launching {} for {}: {} {}",
            rom.display(),
            system.id,
            plan.program.display(),
            shell_words::join(&plan.args)
        );
        launch_external_program(&plan.program, &plan.args)?;
        Ok(plan)
    }

    /// Installed core names, e.g. `snes9x`.
    pub fn available_cores(&self) -> Result<Vec<String>, FsError> {
        let suffix = format!("_libretro.{}", self.config.core_extension);
        Ok(rfs::list_directory(&self.config.cores_dir)?
            .into_iter()
            .filter(|e| e.is_file)
            .filter_map(|e| e.name.strip_suffix(&suffix).map(str::to_string))
            .collect())
    }
}

fn plan_from_template(
    template: &CommandTemplate,
    rom: &Path,
    core: &Path,
) -> Result<LaunchPlan, LaunchError> {
    let words = shell_words::split(template.as_str())
        .map_err(|e| LaunchError::InvalidCommand(format!("{}: {}", template, e)))?;

    let rom = rom.to_string_lossy();
    let core = core.to_string_lossy();
    let mentions_rom = words.iter().any(|w| w.contains("{rom}"));

    let mut words = words
        .into_iter()
        .map(|w| w.replace("{rom}", &rom).replace("{core}", &core));

    let program = words
        .next()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| LaunchError::InvalidCommand(template.to_string()))?;

    let mut args: Vec<String> = words.collect();
    if !mentions_rom {
        args.push(rom.into_owned());
    }

    Ok(LaunchPlan {
        program: PathBuf::from(program),
        args,
    })
}

/// Spawns a program detached from the front-end. The child is reaped on a
/// helper thread so it never lingers as a zombie; its exit status is only logged.
pub fn launch_external_program(program: &Path, args: &[String]) -> Result<(), LaunchError> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let mut child = command.spawn()?;
    let name = program.display().to_string();
    std::thread::spawn(move || match child.wait() {
        Ok(status) => log::debug!("{} exited with {}", name, status),
        Err(e) => log::warn!("Failed to wait for {}: {}", name, e),
    });
    Ok(())
}
