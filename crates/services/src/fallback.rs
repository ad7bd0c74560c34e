//! Bundled question set used whenever the remote source is unusable.

use quiz_core::model::{Question, QuestionDraft, QuestionId};

const FALLBACK: &[(i64, &str, [&str; 4], &str, u32, &str)] = &[
    (
        1,
        "What is the capital of France?",
        ["London", "Berlin", "Paris", "Madrid"],
        "Paris",
        10,
        "Geography",
    ),
    (
        2,
        "Which planet is known as the Red Planet?",
        ["Venus", "Mars", "Jupiter", "Saturn"],
        "Mars",
        10,
        "Science",
    ),
    (
        3,
        "What is the largest mammal in the world?",
        ["African Elephant", "Blue Whale", "Giraffe", "Polar Bear"],
        "Blue Whale",
        10,
        "Nature",
    ),
    (
        4,
        "Who painted the Mona Lisa?",
        ["Vincent van Gogh", "Pablo Picasso", "Leonardo da Vinci", "Michelangelo"],
        "Leonardo da Vinci",
        10,
        "Art",
    ),
    (
        5,
        "What is the chemical symbol for gold?",
        ["Ag", "Fe", "Au", "Cu"],
        "Au",
        10,
        "Science",
    ),
    (
        6,
        "Which programming language was created by James Gosling?",
        ["Python", "Java", "C++", "JavaScript"],
        "Java",
        15,
        "Technology",
    ),
    (
        7,
        "What is the largest ocean on Earth?",
        ["Atlantic Ocean", "Indian Ocean", "Pacific Ocean", "Arctic Ocean"],
        "Pacific Ocean",
        10,
        "Geography",
    ),
    (
        8,
        "Who wrote 'Romeo and Juliet'?",
        ["Charles Dickens", "William Shakespeare", "Jane Austen", "Mark Twain"],
        "William Shakespeare",
        10,
        "Literature",
    ),
    (
        9,
        "What is the square root of 144?",
        ["10", "12", "14", "16"],
        "12",
        15,
        "Mathematics",
    ),
    (
        10,
        "Which element has the atomic number 1?",
        ["Helium", "Hydrogen", "Carbon", "Oxygen"],
        "Hydrogen",
        15,
        "Science",
    ),
];

/// The ten bundled questions, in their canonical order.
#[must_use]
pub fn fallback_questions() -> Vec<Question> {
    FALLBACK
        .iter()
        .filter_map(|(id, prompt, options, answer, points, category)| {
            QuestionDraft {
                id: QuestionId::new(*id),
                prompt: (*prompt).to_owned(),
                options: options.iter().map(|o| (*o).to_owned()).collect(),
                correct_answer: (*answer).to_owned(),
                points: *points,
                category: (*category).to_owned(),
            }
            .validate()
            .ok()
        })
        .collect()
}
