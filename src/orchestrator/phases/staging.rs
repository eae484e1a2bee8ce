//! Staging: copy bundled IP components and toolchain driver scripts into the
//! project tree.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ToolchainConfig;
use crate::error::StagingError;

/// One bundled IP component: source directory under `rtl_src/`, target
/// directory under `<project>/ip/`, and the files to copy.
#[derive(Debug, Clone, Copy)]
pub struct IpComponent {
    pub name: &'static str,
    pub files: &'static [&'static str],
}

pub const IP_COMPONENTS: [IpComponent; 2] = [
    IpComponent {
        name: "axi_cache_secruity_bridge",
        files: &["AXI_cache_secruity_bridge_hw.tcl", "axi_cache_secruity_bridge.v"],
    },
    IpComponent {
        name: "lock_server",
        files: &["lock_server_hw.tcl", "lock_server.vhd"],
    },
];

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StagingError + '_ {
    move |source| StagingError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn copy_asset(source: &Path, target: &Path) -> Result<(), StagingError> {
    if !source.is_file() {
        return Err(StagingError::AssetMissing(source.to_path_buf()));
    }
    fs::copy(source, target).map_err(io_error(target))?;
    log::debug!("[Staging] {} -> {}", source.display(), target.display());
    Ok(())
}

/// Copy every IP component from `<svm_common>/rtl_src/<name>/` to
/// `<project_dir>/ip/<name>/`, creating directories as needed.
pub fn stage_ip_components(svm_common: &Path, project_dir: &Path) -> Result<Vec<PathBuf>, StagingError> {
    let mut staged = Vec::new();

    for component in IP_COMPONENTS {
        let source_dir = svm_common.join("rtl_src").join(component.name);
        let target_dir = project_dir.join("ip").join(component.name);
        fs::create_dir_all(&target_dir).map_err(io_error(&target_dir))?;

        for file in component.files {
            let target = target_dir.join(file);
            copy_asset(&source_dir.join(file), &target)?;
            staged.push(target);
        }
    }

    log::info!("[Staging] Staged {} IP files into {}", staged.len(), project_dir.display());
    Ok(staged)
}

/// Copy both driver scripts from `<svm_common>/scripts/` into the project directory.
pub fn stage_driver_scripts(
    svm_common: &Path,
    project_dir: &Path,
    toolchain: &ToolchainConfig,
) -> Result<Vec<PathBuf>, StagingError> {
    let scripts_dir = svm_common.join("scripts");
    let mut staged = Vec::with_capacity(2);

    for script in [&toolchain.iface_script, &toolchain.system_script] {
        let target = project_dir.join(script);
        copy_asset(&scripts_dir.join(script), &target)?;
        staged.push(target);
    }

    log::info!("[Staging] Staged driver scripts into {}", project_dir.display());
    Ok(staged)
}
