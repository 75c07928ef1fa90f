//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use assert_cmd::Command;

    #[test]
    fn print_help_information() {
        let output = Command::cargo_bin("page-translator")
            .unwrap()
            .arg("--help")
            .output()
            .unwrap();

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(output.status.success());
        assert!(stdout.contains("--target-lang"));
        assert!(stdout.contains("--insert-html"));
        assert!(stdout.contains("--bulk"));
    }

    #[test]
    fn print_version() {
        let output = Command::cargo_bin("page-translator")
            .unwrap()
            .arg("--version")
            .output()
            .unwrap();

        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
    }
}

//  ███████╗ █████╗ ██╗██╗     ██╗███╗   ██╗ ██████╗
//  ██╔════╝██╔══██╗██║██║     ██║████╗  ██║██╔════╝
//  █████╗  ███████║██║██║     ██║██╔██╗ ██║██║  ███╗
//  ██╔══╝  ██╔══██║██║██║     ██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║██║███████╗██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚═╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod failing {
    use assert_cmd::Command;

    #[test]
    fn missing_input_argument() {
        let output = Command::cargo_bin("page-translator").unwrap().output().unwrap();

        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("INPUT"));
    }

    #[test]
    fn nonexistent_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.html");

        let output = Command::cargo_bin("page-translator")
            .unwrap()
            .current_dir(dir.path())
            .env("PAGE_TRANSLATOR_TARGET_LANG", "es")
            .arg(&missing)
            .output()
            .unwrap();

        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("Error"));
    }

    #[test]
    fn invalid_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("broken.toml");
        std::fs::write(&config, "request_timeout_secs = \"soon\"").unwrap();
        let input = dir.path().join("index.html");
        std::fs::write(&input, "<p>Hola</p>").unwrap();

        let output = Command::cargo_bin("page-translator")
            .unwrap()
            .current_dir(dir.path())
            .arg("--config")
            .arg(&config)
            .arg(&input)
            .output()
            .unwrap();

        assert!(!output.status.success());
    }
}
