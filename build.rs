fn git(args: &[&str]) -> Option<String> {
    let output = std::process::Command::new("git").args(args).output().ok()?;
    let stdout = std::str::from_utf8(&output.stdout).ok()?;
    Some(stdout.trim_end().to_string())
}

fn main() {
    // Tell cargo to rebuild if the head or any relevant refs change.
    if let Some(git_dir) = git(&["rev-parse", "--git-dir"]) {
        let git_path = std::path::Path::new(&git_dir);
        let refs_path = git_path.join("refs");
        if git_path.join("HEAD").exists() {
            println!("cargo:rerun-if-changed={git_dir}/HEAD");
        }
        if git_path.join("packed-refs").exists() {
            println!("cargo:rerun-if-changed={git_dir}/packed-refs");
        }
        if refs_path.join("heads").exists() {
            println!("cargo:rerun-if-changed={git_dir}/refs/heads");
        }
        if refs_path.join("tags").exists() {
            println!("cargo:rerun-if-changed={git_dir}/refs/tags");
        }
    }

    if let Some(git_info) = git(&["describe", "--always", "--tags", "--long", "--dirty"]) {
        println!("cargo:rustc-env=_GIT_INFO={git_info}");
    }
}
