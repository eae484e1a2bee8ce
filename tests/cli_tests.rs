//! Command-line tests for the `svm-fixup` and `svm-postprocess` binaries.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn svm_fixup(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_svm-fixup"))
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("Failed to run svm-fixup")
}

fn svm_postprocess(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_svm-postprocess"))
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("Failed to run svm-postprocess")
}

#[test]
fn test_wrong_extension_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("vadd.c"), "__kernel void vadd() {}").unwrap();

    let output = svm_fixup(&["vadd.c"], temp_dir.path());
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unrecognised file type"));
}

#[test]
fn test_missing_source_is_rejected() {
    let temp_dir = TempDir::new().unwrap();

    let output = svm_fixup(&["missing.cl"], temp_dir.path());
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unrecognised file type"));

    let output = svm_postprocess(&["missing.cl"], temp_dir.path());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_missing_explicit_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("vadd.cl"), "").unwrap();

    let output = svm_fixup(&["vadd.cl", "--config", "nope.toml"], temp_dir.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Configuration file not found"));
}

#[test]
fn test_missing_generated_files_fail_with_status_1() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("vadd.cl"), "").unwrap();
    fs::write(temp_dir.path().join("config.toml"), "verbose = false\n").unwrap();

    let output = svm_fixup(&["vadd.cl", "--config", "config.toml", "--json"], temp_dir.path());
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["phase"], "failed");
    assert_eq!(report["project"], "vadd");
}

#[test]
fn test_unwritable_log_file_falls_back_to_stderr() {
    let temp_dir = TempDir::new().unwrap();
    let log_dir = temp_dir.path().join("logs");
    fs::create_dir(&log_dir).unwrap();
    fs::write(temp_dir.path().join("vadd.cl"), "").unwrap();
    fs::write(
        temp_dir.path().join("config.toml"),
        format!("log_file = {:?}\n", log_dir.display().to_string()),
    )
    .unwrap();

    let output = svm_fixup(&["vadd.cl", "--config", "config.toml"], temp_dir.path());
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Log file unavailable"));
    assert!(!stderr.contains("Logger unavailable"));
    assert!(stderr.contains("[Orchestrator] Fixing up project"));
}

#[test]
fn test_postprocess_binary() {
    let temp_dir = TempDir::new().unwrap();
    let project = temp_dir.path().join("work/vadd");
    fs::create_dir_all(&project).unwrap();
    fs::write(temp_dir.path().join("vadd.cl"), "").unwrap();
    fs::write(project.join("acl_iface_partition.qxp"), b"qxp").unwrap();
    fs::write(project.join("system.tcl"), "add_instance a b\nsave_system\n").unwrap();

    let output = svm_postprocess(&["vadd.cl", "--work-dir", "work"], temp_dir.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(!project.join("acl_iface_partition.qxp").exists());
    assert_eq!(fs::read_to_string(project.join("system.tcl")).unwrap(), "save_system\n");
}

/// Full run with `true` standing in for the system integration tool.
#[cfg(unix)]
#[test]
fn test_full_run_with_stub_toolchain() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let project = root.join("vadd");
    let common = root.join("svm_common");
    fs::create_dir_all(&project).unwrap();

    fs::write(root.join("vadd.cl"), "").unwrap();
    fs::write(project.join("vadd.v"), "module vadd_sys_cycle_time\nendmodule\n").unwrap();
    fs::write(
        project.join("vadd_system.v"),
        "module vadd_system\n(\n   input logic clock\n);\n   logic avm_kernel_wr_enable [2];\n\n   vadd_top_wrapper vadd\n   (\n      .avm_efi_vadd_0_host_memory_bridge_load_512bit_host_memory_bridge_a0b1c2d3_load_512bit_0_inst0_enable(avm_kernel_rd_enable[0])\n   );\nendmodule\n",
    )
    .unwrap();
    fs::write(
        project.join("vadd_system_hw.tcl"),
        "add_fileset QUARTUS_SYNTH QUARTUS_SYNTH \"\" \"\"\n",
    )
    .unwrap();
    fs::write(project.join("system.tcl"), "add_instance a b\n").unwrap();

    for (component, files) in [
        (
            "axi_cache_secruity_bridge",
            ["AXI_cache_secruity_bridge_hw.tcl", "axi_cache_secruity_bridge.v"],
        ),
        ("lock_server", ["lock_server_hw.tcl", "lock_server.vhd"]),
    ] {
        let dir = common.join("rtl_src").join(component);
        fs::create_dir_all(&dir).unwrap();
        for file in files {
            fs::write(dir.join(file), file).unwrap();
        }
    }
    fs::create_dir_all(common.join("scripts")).unwrap();
    fs::write(common.join("scripts/iface.tcl"), "").unwrap();
    fs::write(common.join("scripts/svm_system.tcl"), "").unwrap();

    fs::write(
        root.join("config.toml"),
        format!(
            "svm_common_dir = {:?}\n\n[toolchain]\nprogram = \"true\"\niface_script = \"iface.tcl\"\nsystem_script = \"svm_system.tcl\"\n",
            common.display().to_string()
        ),
    )
    .unwrap();

    let output = svm_fixup(&["vadd.cl", "--config", "config.toml", "--json", "-v"], root);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["phase"], "completed");
    assert_eq!(report["totals"]["svm"], 1);
    assert_eq!(report["kernels"][0]["kernel"], "vadd");

    let system = fs::read_to_string(project.join("vadd_system.v")).unwrap();
    assert!(system.contains("avm_svm_port_0_rw_readdata"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("[Rewrite]"));
}
