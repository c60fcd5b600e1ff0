use crate::error::Error;
use crate::model::{
    Difficulty, Lesson, LessonId, Question, QuestionId, QuestionKind, SectionId, SkillSection,
};

//
// ─── BUILT-IN CATALOG ──────────────────────────────────────────────────────────
//

/// Builds the built-in skill tree.
///
/// One "Programming Fundamentals" section with a linear prerequisite chain:
/// variables-basics → data-types → conditionals → loops → functions. The
/// data is static; it goes through the validated constructors like any other
/// content, so assembly is fallible on paper even though the fixtures are
/// known good.
///
/// # Errors
///
/// Propagates model validation errors from the constructors.
pub fn sections() -> Result<Vec<SkillSection>, Error> {
    Ok(vec![fundamentals()?])
}

/// Looks up a lesson anywhere in the catalog.
#[must_use]
pub fn find_lesson<'a>(sections: &'a [SkillSection], id: &LessonId) -> Option<&'a Lesson> {
    sections.iter().find_map(|section| section.lesson(id))
}

fn fundamentals() -> Result<SkillSection, Error> {
    let section = SkillSection::new(
        SectionId::new("fundamentals"),
        "Programming Fundamentals",
        "Learn the basic building blocks of programming",
        "💻",
        vec![
            variables_basics()?,
            data_types()?,
            conditionals()?,
            loops()?,
            functions()?,
        ],
    )?;
    Ok(section)
}

fn variables_basics() -> Result<Lesson, Error> {
    let questions = vec![
        Question::new(
            QuestionId::new("var-1"),
            QuestionKind::MultipleChoice,
            "Which is the correct way to declare a variable in JavaScript?",
            vec![
                "var name = \"John\";".into(),
                "variable name = \"John\";".into(),
                "declare name = \"John\";".into(),
                "string name = \"John\";".into(),
            ],
            "var name = \"John\";",
            "In JavaScript, variables are declared with \"var\", \"let\" or \"const\".",
            50,
            Difficulty::Beginner,
            "variables",
        )?,
        Question::new(
            QuestionId::new("var-2"),
            QuestionKind::CodeCompletion,
            "Complete the code to create a variable named \"age\" with the value 25:",
            vec![
                "let age = ___;".into(),
                "const age = ___;".into(),
                "var age = ___;".into(),
            ],
            "25",
            "25 is an integer, so it is assigned directly without quotes.",
            75,
            Difficulty::Beginner,
            "variables",
        )?,
    ];

    let lesson = Lesson::new(
        LessonId::new("variables-basics"),
        "Variables",
        "Learn what variables are and how to use them",
        "variables",
        Difficulty::Beginner,
        100,
        vec![],
        "Variables are containers that store data. In JavaScript you declare them with:\n\
         \n\
         - var: the traditional form (avoid in modern code)\n\
         - let: for values that change\n\
         - const: for values that never change\n\
         \n\
         Examples:\n\
         let name = \"Ana\";\n\
         const age = 25;\n\
         let score = 0;",
        questions,
    )?;
    Ok(lesson)
}

fn data_types() -> Result<Lesson, Error> {
    let lesson = Lesson::new(
        LessonId::new("data-types"),
        "Data Types",
        "Numbers, strings, booleans and more",
        "data-types",
        Difficulty::Beginner,
        120,
        vec![LessonId::new("variables-basics")],
        "JavaScript has several data types:\n\
         \n\
         - Numbers: 42, 3.14, -7\n\
         - Strings: \"Hello\", 'World'\n\
         - Booleans: true, false\n\
         - null and undefined\n\
         - Objects and arrays\n\
         \n\
         Examples:\n\
         let number = 42;\n\
         let message = \"Hi!\";\n\
         let isTrue = true;",
        // no quiz authored for this lesson yet
        vec![],
    )?;
    Ok(lesson)
}

fn conditionals() -> Result<Lesson, Error> {
    let questions = vec![Question::new(
        QuestionId::new("cond-1"),
        QuestionKind::MultipleChoice,
        "Which operator means \"equal to\" in JavaScript?",
        vec!["=".into(), "==".into(), "===".into(), "!=".into()],
        "===",
        "The === operator compares both value and type, stricter than ==.",
        60,
        Difficulty::Beginner,
        "conditionals",
    )?];

    let lesson = Lesson::new(
        LessonId::new("conditionals"),
        "Conditionals",
        "Make decisions in your code",
        "conditionals",
        Difficulty::Beginner,
        150,
        vec![LessonId::new("data-types")],
        "Conditionals let your program make decisions:\n\
         \n\
         - if: runs code when a condition is true\n\
         - else: runs code when it is false\n\
         - else if: chains several conditions\n\
         \n\
         Example:\n\
         if (age >= 18) {\n\
           console.log(\"You are an adult\");\n\
         } else {\n\
           console.log(\"You are a minor\");\n\
         }",
        questions,
    )?;
    Ok(lesson)
}

fn loops() -> Result<Lesson, Error> {
    let questions = vec![Question::new(
        QuestionId::new("loop-1"),
        QuestionKind::Debugging,
        "Find the bug in this loop:\nfor (let i = 0; i < 10; i--) {\n  console.log(i);\n}",
        vec!["i++".into(), "i--".into(), "i < 10".into(), "let i = 0".into()],
        "i--",
        "The loop should use i++ to increment; i-- makes it run forever.",
        100,
        Difficulty::Intermediate,
        "loops",
    )?];

    let lesson = Lesson::new(
        LessonId::new("loops"),
        "Loops",
        "Repeat actions efficiently",
        "loops",
        Difficulty::Intermediate,
        180,
        vec![LessonId::new("conditionals")],
        "Loops run code multiple times:\n\
         \n\
         - for: when you know how many times\n\
         - while: while a condition holds\n\
         - forEach: over arrays\n\
         \n\
         Example:\n\
         for (let i = 0; i < 5; i++) {\n\
           console.log(\"Number: \" + i);\n\
         }",
        questions,
    )?;
    Ok(lesson)
}

fn functions() -> Result<Lesson, Error> {
    let lesson = Lesson::new(
        LessonId::new("functions"),
        "Functions",
        "Organize your code into reusable blocks",
        "functions",
        Difficulty::Intermediate,
        200,
        vec![LessonId::new("loops")],
        "Functions are reusable blocks of code:\n\
         \n\
         - function: the traditional declaration\n\
         - arrow functions: the modern syntax\n\
         - parameters and return values\n\
         \n\
         Example:\n\
         function greet(name) {\n\
           return \"Hello, \" + name + \"!\";\n\
         }\n\
         \n\
         const sum = (a, b) => a + b;",
        // no quiz authored for this lesson yet
        vec![],
    )?;
    Ok(lesson)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
