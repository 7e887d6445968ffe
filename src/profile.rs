//! Profile sub-entities owned by the account identity. Extended counselor
//! attributes (title, college, bio) live here instead of being probed off
//! the account row with ad hoc queries.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use serde::{Deserialize, Serialize};

use crate::types::UserId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub user_id: UserId,
    pub student_no: String,
    pub program: String,
    pub year_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounselorProfile {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub title: String,
    pub college: String,
    pub bio: String,
}

impl CounselorProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileDirectory {
    students: Arc<Mutex<HashMap<UserId, StudentProfile>>>,
    counselors: Arc<Mutex<HashMap<UserId, CounselorProfile>>>,
}

impl ProfileDirectory {
    pub fn upsert_student(&self, profile: StudentProfile) {
        let mut students = self.students.lock().unwrap();
        students.insert(profile.user_id, profile);
    }

    pub fn upsert_counselor(&self, profile: CounselorProfile) {
        let mut counselors = self.counselors.lock().unwrap();
        counselors.insert(profile.user_id, profile);
    }

    pub fn student(&self, user_id: UserId) -> Option<StudentProfile> {
        self.students.lock().unwrap().get(&user_id).cloned()
    }

    pub fn counselor(&self, user_id: UserId) -> Option<CounselorProfile> {
        self.counselors.lock().unwrap().get(&user_id).cloned()
    }

    /// Counselor directory, optionally filtered by college affiliation,
    /// ordered by last name.
    pub fn counselors(&self, college: Option<&str>) -> Vec<CounselorProfile> {
        let counselors = self.counselors.lock().unwrap();
        let mut listing: Vec<CounselorProfile> = counselors
            .values()
            .filter(|profile| match college {
                Some(college) => profile.college.eq_ignore_ascii_case(college),
                None => true,
            })
            .cloned()
            .collect();
        listing.sort_unstable_by(|a, b| {
            (a.last_name.as_str(), a.first_name.as_str())
                .cmp(&(b.last_name.as_str(), b.first_name.as_str()))
        });
        listing
    }
}
