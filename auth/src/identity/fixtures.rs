use campus_shared::types::{PermissionSet, Principal, Role, capability};

/// Shared secret accepted for every built-in demo principal.
pub const DEMO_SECRET: &str = "password123";

/// The built-in demo accounts, one per role.
pub fn demo_principals() -> Vec<Principal> {
    vec![
        Principal {
            id: "1".into(),
            name: "Dr. Sarah Johnson".into(),
            email: "admin@university.edu".into(),
            role: Role::Admin,
            permissions: PermissionSet::wildcard(),
            department: "Administration".into(),
            student_id: None,
            year: None,
            title: Some("Registrar".into()),
            last_login: 0,
            switched_from: None,
        },
        Principal {
            id: "2".into(),
            name: "Prof. Michael Chen".into(),
            email: "faculty@university.edu".into(),
            role: Role::Faculty,
            permissions: PermissionSet::from_tags([
                capability::STUDENTS,
                capability::ACADEMICS,
                capability::SCHEDULE,
                capability::EXAMS,
                capability::ROOMS,
            ]),
            department: "Computer Science".into(),
            student_id: None,
            year: None,
            title: Some("Associate Professor".into()),
            last_login: 0,
            switched_from: None,
        },
        Principal {
            id: "3".into(),
            name: "Emily Davis".into(),
            email: "student@university.edu".into(),
            role: Role::Student,
            permissions: PermissionSet::from_tags([
                capability::ACADEMICS,
                capability::SCHEDULE,
                capability::FINANCIAL,
                capability::TRANSCRIPTS,
            ]),
            department: "Computer Science".into(),
            student_id: Some("STU2024001".into()),
            year: Some("Junior".into()),
            title: None,
            last_login: 0,
            switched_from: None,
        },
    ]
}
