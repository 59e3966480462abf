//! Dashboard data and derived metrics.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::resource::{CvKind, CvRecord, ProfileRecord, RefereeRecord, WorkExperienceRecord};

/// Point-in-time copy of the four collections owned by one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardData {
    pub profile: ProfileRecord,
    pub work_experience: Vec<WorkExperienceRecord>,
    pub referees: Vec<RefereeRecord>,
    pub cvs: Vec<CvRecord>,
}

impl DashboardData {
    pub fn completion(&self) -> CompletionScore {
        completion(self)
    }

    /// Status of the user's CV, judged by the first one on file.
    pub fn cv_status(&self) -> CvStatus {
        match self.cvs.first() {
            None => CvStatus::Missing,
            Some(cv) if cv.kind == CvKind::Generated => CvStatus::Generated,
            Some(_) => CvStatus::Uploaded,
        }
    }
}

/// Profile completion as a percentage in steps of 25.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionScore(u8);

impl CompletionScore {
    const CATEGORY_WEIGHT: u8 = 25;

    /// Sums 25 for every populated category. There is no partial credit.
    pub fn from_categories(
        personal_details: bool,
        work_experience: bool,
        referees: bool,
        cv: bool,
    ) -> Self {
        let score = [personal_details, work_experience, referees, cv]
            .into_iter()
            .filter(|present| *present)
            .count() as u8
            * Self::CATEGORY_WEIGHT;
        Self(score)
    }

    pub fn percent(&self) -> u8 {
        self.0
    }

    pub fn is_complete(&self) -> bool {
        self.0 == 100
    }

    /// Arc of a completion ring, in degrees.
    pub fn degrees(&self) -> u16 {
        u16::from(self.0) * 36 / 10
    }
}

impl fmt::Display for CompletionScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Computes the completion score of a dashboard.
pub fn completion(data: &DashboardData) -> CompletionScore {
    CompletionScore::from_categories(
        data.profile.has_personal_details(),
        !data.work_experience.is_empty(),
        !data.referees.is_empty(),
        !data.cvs.is_empty(),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CvStatus {
    Missing,
    Generated,
    Uploaded,
}

impl fmt::Display for CvStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Missing => "Missing",
            Self::Generated => "Generated",
            Self::Uploaded => "Uploaded",
        };
        f.write_str(label)
    }
}
