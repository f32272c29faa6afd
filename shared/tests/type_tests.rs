/// Integration-level tests for the `campus-shared` crate.
///
/// Each section tests one module; unit tests that are tightly coupled to
/// private helpers live inside the modules themselves (see `#[cfg(test)]`
/// blocks in `principal.rs` and `app_config.rs`).
// ---------------------------------------------------------------------------
// Permission sets
// ---------------------------------------------------------------------------
#[cfg(test)]
mod permission_tests {
    use campus_shared::types::*;
    use proptest::prelude::*;

    fn tag() -> impl Strategy<Value = String> {
        "[a-z]{1,12}".prop_filter("wildcard is not a plain tag", |s| s != WILDCARD)
    }

    proptest! {
        #[test]
        fn wildcard_allows_every_capability(
            extra in proptest::collection::vec(tag(), 0..5),
            probe in "\\PC{0,24}",
        ) {
            let mut tags = extra.clone();
            tags.push(WILDCARD.to_string());
            let set = PermissionSet::from_tags(tags);
            prop_assert!(set.allows(&probe));
        }

        #[test]
        fn without_wildcard_allows_is_exact_membership(
            tags in proptest::collection::vec(tag(), 0..6),
            probe in tag(),
        ) {
            let set = PermissionSet::from_tags(tags.clone());
            prop_assert_eq!(set.allows(&probe), tags.contains(&probe));
        }
    }

    #[test]
    fn deserializes_from_json_array() {
        let set: PermissionSet = serde_json::from_str(r#"["students","schedule"]"#).unwrap();
        assert!(set.allows(capability::STUDENTS));
        assert!(!set.allows(capability::FINANCIAL));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display_lists_tags() {
        let set = PermissionSet::from_tags(["schedule", "academics"]);
        assert_eq!(set.to_string(), "[academics, schedule]");
    }
}

// ---------------------------------------------------------------------------
// Principal
// ---------------------------------------------------------------------------

#[cfg(test)]
mod principal_tests {
    use campus_shared::types::*;

    fn faculty() -> Principal {
        Principal {
            id: "2".into(),
            name: "Prof. Michael Chen".into(),
            email: "faculty@university.edu".into(),
            role: Role::Faculty,
            permissions: PermissionSet::from_tags(["students", "academics", "schedule"]),
            department: "Computer Science".into(),
            student_id: None,
            year: None,
            title: Some("Associate Professor".into()),
            last_login: 1_700_000_000,
            switched_from: Some(Role::Admin),
        }
    }

    #[test]
    fn principal_json_roundtrip_is_identical() {
        let p = faculty();
        let json = serde_json::to_string(&p).unwrap();
        let back: Principal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn principal_json_contains_expected_keys() {
        let json = serde_json::to_value(faculty()).unwrap();
        for key in &[
            "id",
            "name",
            "email",
            "role",
            "permissions",
            "department",
            "title",
            "lastLogin",
            "switchedFrom",
        ] {
            assert!(json.get(key).is_some(), "missing key: {}", key);
        }
        assert_eq!(json["role"], "faculty");
        assert_eq!(json["switchedFrom"], "admin");
    }

    #[test]
    fn minimal_stored_principal_still_parses() {
        // older records carry no optional fields
        let json = r#"{
            "id": "9",
            "name": "Guest",
            "email": "guest@university.edu",
            "role": "student",
            "permissions": ["academics"],
            "department": "Undeclared"
        }"#;
        let p: Principal = serde_json::from_str(json).unwrap();
        assert_eq!(p.last_login, 0);
        assert!(p.student_id.is_none());
        assert!(p.has_permission("academics"));
    }

    #[test]
    fn unknown_role_fails_to_parse() {
        let json = r#"{"id":"9","name":"x","email":"x","role":"dean","permissions":[],"department":""}"#;
        assert!(serde_json::from_str::<Principal>(json).is_err());
    }

    #[test]
    fn has_role_is_equality() {
        let p = faculty();
        assert!(p.has_role(Role::Faculty));
        assert!(!p.has_role(Role::Admin));
    }

    #[test]
    fn display_shows_name_email_and_role() {
        let out = faculty().to_string();
        assert!(out.contains("Prof. Michael Chen"));
        assert!(out.contains("faculty@university.edu"));
        assert!(out.contains("faculty"));
    }
}

// ---------------------------------------------------------------------------
// Token claims / session record
// ---------------------------------------------------------------------------

#[cfg(test)]
mod session_tests {
    use campus_shared::types::*;

    fn sample_claims() -> TokenClaims {
        TokenClaims {
            sub: "1".to_string(),
            email: "admin@university.edu".to_string(),
            role: Role::Admin,
            session_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_086_400,
        }
    }

    #[test]
    fn claims_json_contains_expected_keys() {
        let json = serde_json::to_value(sample_claims()).unwrap();
        for key in &["sub", "email", "role", "session_id", "iat", "exp"] {
            assert!(json.get(key).is_some(), "missing key: {}", key);
        }
        assert!(json["session_id"].is_string());
    }

    #[test]
    fn record_display_omits_token() {
        let record = SessionRecord::new(
            serde_json::from_str(
                r#"{"id":"1","name":"A","email":"a@u.edu","role":"admin","permissions":["all"],"department":"x"}"#,
            )
            .unwrap(),
            "secret-token-value".into(),
        );
        let out = format!("{}", record);
        assert!(out.contains("principal_id=1"));
        assert!(!out.contains("secret-token-value"));
    }

    #[test]
    fn storage_keys_are_distinct() {
        assert_ne!(keys::PRINCIPAL, keys::TOKEN);
    }
}

// ---------------------------------------------------------------------------
// Login / errors
// ---------------------------------------------------------------------------

#[cfg(test)]
mod login_tests {
    use campus_shared::types::*;

    // ── LoginRequest deserialization ──────────────────────────────────────────

    #[test]
    fn login_request_accepts_email_and_password_aliases() {
        let json = r#"{"email":"faculty@university.edu","password":"password123"}"#;
        let r: LoginRequest = serde_json::from_str(json).unwrap();
        assert_eq!(r.identifier, "faculty@university.edu");
        assert_eq!(r.secret, "password123");
    }

    #[test]
    fn login_request_accepts_canonical_names() {
        let json = r#"{"identifier":"x","secret":"y"}"#;
        let r: LoginRequest = serde_json::from_str(json).unwrap();
        assert_eq!(r.identifier, "x");
    }

    // ── AuthError ─────────────────────────────────────────────────────────────

    fn all_errors() -> Vec<AuthError> {
        vec![
            AuthError::UserNotFound("x".into()),
            AuthError::InvalidCredential,
            AuthError::NoActiveSession,
            AuthError::UnauthorizedRoleSwitch {
                from: Role::Faculty,
            },
            AuthError::UnknownRole(Role::Student),
            AuthError::CorruptedSession("bad".into()),
            AuthError::AuthenticationInProgress,
            AuthError::Storage(StorageError::InvalidKey("..".into())),
            AuthError::Token(TokenError::Expired { exp: 0 }),
        ]
    }

    #[test]
    fn all_error_variants_have_non_empty_messages() {
        for e in all_errors() {
            assert!(!e.to_code().is_empty());
            assert!(!e.to_message().is_empty());
            assert!(!e.to_string().is_empty());
        }
    }

    #[test]
    fn all_error_codes_unique() {
        let errors = all_errors();
        let codes: Vec<&str> = errors.iter().map(|e| e.to_code()).collect();
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(codes.len(), unique.len(), "duplicate auth error codes");
    }

    #[test]
    fn login_error_response_is_serializable() {
        let r = AuthError::InvalidCredential.to_response();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["code"], "INVALID_CREDENTIAL");
    }

    #[test]
    fn session_error_response_is_serializable() {
        let r = AuthError::UnauthorizedRoleSwitch {
            from: Role::Student,
        }
        .to_session_response();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["code"], "UNAUTHORIZED_ROLE_SWITCH");
    }

    #[test]
    fn session_response_success_omits_missing_principal() {
        let r = SessionResponse::Success {
            message: "Logged out successfully".into(),
            principal: None,
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["status"], "success");
        assert!(json.get("principal").is_none());
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[cfg(test)]
mod config_tests {
    use campus_shared::config::{load_config, parse_config, validate_config};
    use campus_shared::types::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert!(!config.auth.auto_provision);
        assert_eq!(config.auth.token_ttl_minutes, 24 * 60);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config = parse_config(
            r#"
            [auth]
            login_delay_ms = 0
            auto_provision = true
            "#,
        )
        .unwrap();
        assert_eq!(config.auth.login_delay_ms, 0);
        assert!(config.auth.auto_provision);
        assert_eq!(config.auth.demo_secret.as_deref(), Some("password123"));
        assert_eq!(config.storage.dir, ".campus-session");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let err = parse_config("[auth]\ntoken_ttl_minutes = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(_)));
    }

    #[test]
    fn blank_storage_dir_is_rejected() {
        let err = parse_config("[storage]\ndir = \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("storage.dir"));
    }

    #[test]
    fn duplicate_principal_emails_are_rejected() {
        let err = parse_config(
            r#"
            [[principals]]
            id = "1"
            name = "A"
            email = "a@university.edu"
            role = "admin"
            permissions = ["all"]
            department = "x"

            [[principals]]
            id = "2"
            name = "B"
            email = "A@University.edu"
            role = "faculty"
            permissions = ["schedule"]
            department = "x"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate principal email"));
    }

    #[test]
    fn auto_provision_needs_an_admin_principal() {
        let err = parse_config(
            r#"
            [auth]
            auto_provision = true

            [[principals]]
            id = "3"
            name = "S"
            email = "s@university.edu"
            role = "student"
            permissions = ["academics"]
            department = "x"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("admin"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = parse_config("[auth\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn load_config_rejects_empty_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "   ").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("empty file"));
    }

    #[test]
    fn load_config_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[storage]\ndir = \"/tmp/campus\"").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.storage.dir, "/tmp/campus");
    }

    #[test]
    fn auto_provision_is_off_unless_configured() {
        let config = parse_config("[auth]\nlogin_delay_ms = 0\n").unwrap();
        assert!(!config.auth.auto_provision);
        assert!(!AuthSettings::default().auto_provision);
    }

    #[test]
    fn shipped_demo_config_enables_auto_provision() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../config.toml");
        let config = load_config(&path).unwrap();
        assert!(config.auth.auto_provision);
        assert_eq!(config.storage.dir, ".campus-session");
        assert!(config.principals.is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
