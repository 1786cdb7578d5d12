use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::model::{Course, CourseId, LessonId, ModuleId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate course id: {0}")]
    DuplicateCourseId(CourseId),

    #[error("duplicate course slug: {0}")]
    DuplicateCourseSlug(String),

    #[error("duplicate module id: {0}")]
    DuplicateModuleId(ModuleId),

    #[error("duplicate lesson id: {0}")]
    DuplicateLessonId(LessonId),

    #[error("duplicate lesson slug {slug} in course {course}")]
    DuplicateLessonSlug { course: CourseId, slug: String },

    #[error("module {module} points at course {found}, expected {expected}")]
    ModuleParentMismatch {
        module: ModuleId,
        expected: CourseId,
        found: CourseId,
    },

    #[error("lesson {lesson} points at module {found}, expected {expected}")]
    LessonParentMismatch {
        lesson: LessonId,
        expected: ModuleId,
        found: ModuleId,
    },

    #[error("module {module} has order {found}, expected {expected}")]
    ModuleOrder {
        module: ModuleId,
        expected: u32,
        found: u32,
    },

    #[error("lesson {lesson} has order {found}, expected {expected}")]
    LessonOrder {
        lesson: LessonId,
        expected: u32,
        found: u32,
    },

    #[error("course {0} lists itself as a prerequisite")]
    SelfPrerequisite(CourseId),

    #[error("prerequisite cycle through course {0}")]
    PrerequisiteCycle(CourseId),
}

/// Check the structural invariants of a course forest.
///
/// Prerequisite ids that do not resolve are tolerated here; lookups filter
/// them out.
///
/// # Errors
///
/// Returns the first `CatalogError` found.
pub fn validate_courses(courses: &[Course]) -> Result<(), CatalogError> {
    let mut course_ids = HashSet::new();
    let mut course_slugs = HashSet::new();
    let mut module_ids = HashSet::new();
    let mut lesson_ids = HashSet::new();

    for course in courses {
        if !course_ids.insert(course.id.clone()) {
            return Err(CatalogError::DuplicateCourseId(course.id.clone()));
        }
        if !course_slugs.insert(course.slug.clone()) {
            return Err(CatalogError::DuplicateCourseSlug(course.slug.clone()));
        }
        if course.prerequisites.contains(&course.id) {
            return Err(CatalogError::SelfPrerequisite(course.id.clone()));
        }

        let mut lesson_slugs = HashSet::new();
        for (module_index, module) in course.modules.iter().enumerate() {
            if !module_ids.insert(module.id.clone()) {
                return Err(CatalogError::DuplicateModuleId(module.id.clone()));
            }
            if module.course_id != course.id {
                return Err(CatalogError::ModuleParentMismatch {
                    module: module.id.clone(),
                    expected: course.id.clone(),
                    found: module.course_id.clone(),
                });
            }
            let expected = position_to_order(module_index);
            if module.order != expected {
                return Err(CatalogError::ModuleOrder {
                    module: module.id.clone(),
                    expected,
                    found: module.order,
                });
            }

            for (lesson_index, lesson) in module.lessons.iter().enumerate() {
                if !lesson_ids.insert(lesson.id.clone()) {
                    return Err(CatalogError::DuplicateLessonId(lesson.id.clone()));
                }
                if !lesson_slugs.insert(lesson.slug.as_str()) {
                    return Err(CatalogError::DuplicateLessonSlug {
                        course: course.id.clone(),
                        slug: lesson.slug.clone(),
                    });
                }
                if lesson.module_id != module.id {
                    return Err(CatalogError::LessonParentMismatch {
                        lesson: lesson.id.clone(),
                        expected: module.id.clone(),
                        found: lesson.module_id.clone(),
                    });
                }
                let expected = position_to_order(lesson_index);
                if lesson.order != expected {
                    return Err(CatalogError::LessonOrder {
                        lesson: lesson.id.clone(),
                        expected,
                        found: lesson.order,
                    });
                }
            }
        }
    }

    check_prerequisite_cycles(courses)
}

fn position_to_order(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

fn check_prerequisite_cycles(courses: &[Course]) -> Result<(), CatalogError> {
    let edges: HashMap<&str, Vec<&str>> = courses
        .iter()
        .map(|course| {
            let prereqs = course
                .prerequisites
                .iter()
                .map(CourseId::as_str)
                .collect::<Vec<_>>();
            (course.id.as_str(), prereqs)
        })
        .collect();

    let mut marks: HashMap<&str, Mark> = HashMap::new();
    for course in courses {
        visit(course.id.as_str(), &edges, &mut marks)?;
    }
    Ok(())
}

fn visit<'a>(
    id: &'a str,
    edges: &HashMap<&'a str, Vec<&'a str>>,
    marks: &mut HashMap<&'a str, Mark>,
) -> Result<(), CatalogError> {
    match marks.get(id) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Visiting) => return Err(CatalogError::PrerequisiteCycle(CourseId::new(id))),
        None => {}
    }
    // Unresolved prerequisites have no outgoing edges.
    let Some(next) = edges.get(id) else {
        return Ok(());
    };
    marks.insert(id, Mark::Visiting);
    for &prereq in next {
        visit(prereq, edges, marks)?;
    }
    marks.insert(id, Mark::Done);
    Ok(())
}
