use std::{env, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=shim/flowfilter_shim.cpp");
    println!("cargo:rerun-if-changed=shim/flowfilter_shim.h");
    println!("cargo:rerun-if-env-changed=FLOWFILTER_INCLUDE_DIR");
    println!("cargo:rerun-if-env-changed=FLOWFILTER_LIB_DIR");
    println!("cargo:rerun-if-env-changed=CUDA_HOME");
    println!("cargo:rerun-if-env-changed=CUDA_PATH");

    // only the gpu backend needs native code
    if env::var_os("CARGO_FEATURE_CUDA").is_none() {
        return;
    }

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_default());
    let shim_dir = manifest_dir.join("shim");

    let cuda_root = env::var("CUDA_HOME")
        .or_else(|_| env::var("CUDA_PATH"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/usr/local/cuda"));

    let mut include_candidates = vec![shim_dir.clone(), cuda_root.join("include")];
    if let Ok(dir) = env::var("FLOWFILTER_INCLUDE_DIR") {
        include_candidates.insert(0, PathBuf::from(dir));
    }
    include_candidates.push(PathBuf::from("/usr/local/include"));

    let mut build = cc::Build::new();
    build
        .cpp(true)
        .flag_if_supported("-std=c++14")
        .file(shim_dir.join("flowfilter_shim.cpp"))
        .warnings(true);
    for dir in include_candidates.iter().filter(|p| p.exists()) {
        build.include(dir);
    }
    build.compile("flowfilter_shim");

    let mut lib_candidates = vec![
        cuda_root.join("lib64"),
        cuda_root.join("lib"),
        PathBuf::from("/usr/local/lib"),
    ];
    if let Ok(dir) = env::var("FLOWFILTER_LIB_DIR") {
        lib_candidates.insert(0, PathBuf::from(dir));
    }
    for dir in lib_candidates.iter().filter(|p| p.exists()) {
        println!("cargo:rustc-link-search=native={}", dir.display());
    }

    println!("cargo:rustc-link-lib=dylib=flowfilter_gpu");
    println!("cargo:rustc-link-lib=dylib=flowfilter");
    println!("cargo:rustc-link-lib=dylib=cudart");
}
