use std::env;
use std::process::Command;

// One SIMD backend is selected per build; `fallback` when nothing better is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    Avx2,
    Neon,
    Fallback,
}

impl Backend {
    fn cfg_flag(self) -> &'static str {
        match self {
            Backend::Avx2 => "avx2",
            Backend::Neon => "neon",
            Backend::Fallback => "fallback",
        }
    }
}

// The x86 features the AVX2 kernel needs; all of them must be present.
const AVX2_FEATURES: [&str; 2] = ["avx2", "fma"];

// Feature detection trait to make implementations more modular
trait CpuFeatureDetector {
    fn has_features(&self, names: &[&str]) -> bool;
    fn is_applicable(&self) -> bool;
}

// Linux CPU feature detector
struct LinuxDetector;
impl CpuFeatureDetector for LinuxDetector {
    fn has_features(&self, names: &[&str]) -> bool {
        let Ok(cpuinfo) = std::fs::read_to_string("/proc/cpuinfo") else {
            return false;
        };

        // Match whole words on the `flags` line so that `fma` is not satisfied by `fma4`.
        cpuinfo
            .lines()
            .filter(|line| line.starts_with("flags"))
            .take(1)
            .any(|line| {
                let flags: Vec<&str> = line.split_whitespace().collect();
                names.iter().all(|name| flags.contains(name))
            })
    }

    fn is_applicable(&self) -> bool {
        cfg!(target_os = "linux")
    }
}

// macOS CPU feature detector
struct MacOSDetector;
impl CpuFeatureDetector for MacOSDetector {
    fn has_features(&self, names: &[&str]) -> bool {
        let Ok(output) = Command::new("sysctl").args(["-a"]).output() else {
            return false;
        };
        let contents = String::from_utf8_lossy(&output.stdout).to_lowercase();

        names.iter().all(|name| match *name {
            "avx2" => contents.contains("hw.optional.avx2_0: 1"),
            "fma" => contents.contains("hw.optional.fma: 1"),
            _ => false,
        })
    }

    fn is_applicable(&self) -> bool {
        cfg!(target_os = "macos")
    }
}

// No windows detector: Windows hosts build the portable backend and still pick
// AVX2 at run time through `is_x86_feature_detected!`.

struct PlatformDetector;
impl PlatformDetector {
    fn cpu_features_detectors() -> Vec<Box<dyn CpuFeatureDetector>> {
        vec![Box::new(LinuxDetector), Box::new(MacOSDetector)]
    }

    fn host_has(names: &[&str]) -> bool {
        Self::cpu_features_detectors()
            .into_iter()
            .find(|detector| detector.is_applicable())
            .is_some_and(|detector| detector.has_features(names))
    }

    fn select(target_arch: &str, is_native_build: bool) -> Backend {
        match target_arch {
            // NEON is part of the aarch64 baseline.
            "aarch64" => Backend::Neon,
            "x86_64" if is_native_build && Self::host_has(&AVX2_FEATURES) => Backend::Avx2,
            _ => Backend::Fallback,
        }
    }

    fn apply(backend: Backend) {
        println!("cargo:rustc-cfg={}", backend.cfg_flag());

        println!("cargo::rustc-check-cfg=cfg(avx2)");
        println!("cargo::rustc-check-cfg=cfg(neon)");
        println!("cargo::rustc-check-cfg=cfg(fallback)");
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let target_arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();

    // Host probing only describes the target when we are not cross-compiling.
    let host = env::var("HOST").unwrap_or_default();
    let target = env::var("TARGET").unwrap_or_default();
    let is_native_build = host == target;

    let backend = PlatformDetector::select(&target_arch, is_native_build);
    PlatformDetector::apply(backend);
}
