use crate::catalog::Catalog;
use crate::model::Lesson;

/// Linear learning path through a course, in catalog order.
///
/// Progress state plays no part here; the path is fixed by `order`.
impl Catalog {
    /// The lesson after `lesson_id`, crossing into the next module when
    /// needed. `None` at the end of the course or for unknown lessons.
    #[must_use]
    pub fn next_lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        let loc = self.locate_lesson(lesson_id)?;
        let index = loc.module.lesson_position(lesson_id)?;
        if let Some(next) = loc.module.lessons.get(index + 1) {
            return Some(next);
        }

        let module_index = loc.course.module_position(loc.module.id.as_str())?;
        loc.course
            .modules
            .get(module_index + 1)
            .and_then(|next_module| next_module.first_lesson())
    }

    /// The lesson before `lesson_id`, crossing into the previous module when
    /// needed. `None` at the start of the course or for unknown lessons.
    #[must_use]
    pub fn previous_lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        let loc = self.locate_lesson(lesson_id)?;
        let index = loc.module.lesson_position(lesson_id)?;
        if index > 0 {
            return loc.module.lessons.get(index - 1);
        }

        let module_index = loc.course.module_position(loc.module.id.as_str())?;
        let previous_module = module_index.checked_sub(1)?;
        loc.course
            .modules
            .get(previous_module)
            .and_then(|module| module.last_lesson())
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::Catalog;
    use crate::catalog::test_support::{course, lesson, module};

    fn catalog() -> Catalog {
        Catalog::builtin().expect("bundled catalog is valid")
    }

    fn id(lesson: Option<&crate::model::Lesson>) -> Option<&str> {
        lesson.map(|l| l.id.as_str())
    }

    #[test]
    fn next_stays_inside_module() {
        let catalog = catalog();
        assert_eq!(id(catalog.next_lesson("ai-history")), Some("llm-basics"));
    }

    #[test]
    fn next_crosses_module_boundary() {
        let catalog = catalog();
        assert_eq!(
            id(catalog.next_lesson("ai-applications")),
            Some("attention-mechanism")
        );
    }

    #[test]
    fn previous_crosses_module_boundary() {
        let catalog = catalog();
        assert_eq!(
            id(catalog.previous_lesson("attention-mechanism")),
            Some("ai-applications")
        );
    }

    #[test]
    fn course_boundaries_return_none() {
        let catalog = catalog();
        assert_eq!(id(catalog.next_lesson("attention-mechanism")), None);
        assert_eq!(id(catalog.previous_lesson("ai-history")), None);
        assert_eq!(id(catalog.next_lesson("unknown")), None);
        assert_eq!(id(catalog.previous_lesson("unknown")), None);
    }

    #[test]
    fn next_then_previous_round_trips_every_lesson() {
        let catalog = catalog();
        for course in catalog.all_courses() {
            let lessons: Vec<_> = course.lessons().collect();
            for (index, lesson) in lessons.iter().enumerate() {
                let next = catalog.next_lesson(lesson.id.as_str());
                if index + 1 == lessons.len() {
                    assert!(next.is_none(), "{} should end the course", lesson.id);
                    continue;
                }
                let next = next.unwrap();
                assert_eq!(next.id, lessons[index + 1].id);
                let back = catalog.previous_lesson(next.id.as_str()).unwrap();
                assert_eq!(back.id, lesson.id);
            }
        }
    }

    #[test]
    fn empty_module_is_a_dead_end() {
        let catalog = Catalog::from_courses(vec![course(
            "c1",
            vec![
                module("c1", "m1", 1, vec![lesson("m1", "l1", 1)]),
                module("c1", "m2", 2, vec![]),
                module("c1", "m3", 3, vec![lesson("m3", "l3", 1)]),
            ],
        )])
        .unwrap();
        assert!(catalog.next_lesson("l1").is_none());
        assert!(catalog.previous_lesson("l3").is_none());
    }
}
