//! Outbound message construction.
//!
//! Every user-facing string and flex payload the flows send. Kept in one
//! place so the conversation handlers stay about state, not copy.

use serde_json::json;

use crate::domain::coursework::{Task, Timeliness};
use crate::domain::evaluation::WritingFeedback;
use crate::domain::gamification::{badges::BadgeSpec, points};
use crate::domain::games::{GameKind, GamePlay, GameSummary, GradedAnswer};
use crate::domain::registration::{RegistrationStep, StepKind};
use crate::domain::user::User;
use crate::ports::{OutboundMessage, QuickReplyOption, VocabularyCard};

// ════════════════════════════════════════════════════════════════════════════
// Shared snippets
// ════════════════════════════════════════════════════════════════════════════

pub fn please_register() -> OutboundMessage {
    OutboundMessage::text("กรุณาลงทะเบียนก่อนนะครับ")
}

pub fn generic_error() -> OutboundMessage {
    OutboundMessage::text("เกิดข้อผิดพลาด กรุณาลองใหม่อีกครั้งครับ")
}

fn scores_block(feedback: &WritingFeedback) -> String {
    let s = &feedback.scores;
    format!(
        "📊 คะแนน (เต็ม 20):\n- เนื้อหา: {}/4\n- การลำดับความ: {}/4\n- ไวยากรณ์: {}/4\n- คำศัพท์: {}/4\n- อักขระวิธี: {}/4\n- รวม: {}/20",
        s.content,
        s.organization,
        s.grammar,
        s.vocabulary,
        s.mechanics,
        s.total()
    )
}

// ════════════════════════════════════════════════════════════════════════════
// Registration
// ════════════════════════════════════════════════════════════════════════════

/// Renders a wizard step prompt, attaching quick replies on constrained
/// steps.
pub fn registration_prompt(step: &RegistrationStep) -> OutboundMessage {
    match step.kind {
        StepKind::FreeText => OutboundMessage::text(step.prompt),
        StepKind::QuickReply(choices) => OutboundMessage::quick_reply(
            step.prompt,
            choices
                .iter()
                .map(|c| QuickReplyOption::new(c.label, c.text))
                .collect(),
        ),
    }
}

pub fn registration_started(first_prompt: &str) -> OutboundMessage {
    OutboundMessage::text(format!(
        "สวัสดีครับ! ยินดีต้อนรับสู่ ProficienThAI\n\nเริ่มลงทะเบียนกันเลย\n\n{}",
        first_prompt
    ))
}

pub fn already_registered(thai_name: &str) -> OutboundMessage {
    OutboundMessage::text(format!(
        "สวัสดีครับ คุณ{}! คุณลงทะเบียนแล้ว\n\nหากต้องการแก้ไขข้อมูล กรุณาเลือก \"ข้อมูลส่วนตัว\"",
        thai_name
    ))
}

pub fn registration_completed(thai_name: &str) -> OutboundMessage {
    OutboundMessage::text(format!(
        "ลงทะเบียนเรียบร้อยครับ!\n\nยินดีต้อนรับ คุณ{}\n\nตอนนี้คุณสามารถ:\n- ส่งงาน\n- ขอผลป้อนกลับ\n- ฝึกฝน\n- ดูแดชบอร์ด\n\nเลือกเมนูด้านล่างเพื่อเริ่มต้นได้เลยครับ",
        thai_name
    ))
}

pub fn profile_updated() -> OutboundMessage {
    OutboundMessage::text("อัปเดตข้อมูลเรียบร้อยครับ")
}

// ════════════════════════════════════════════════════════════════════════════
// Feedback
// ════════════════════════════════════════════════════════════════════════════

pub fn feedback_prompt(thai_name: &str) -> OutboundMessage {
    OutboundMessage::text(format!(
        "สวัสดีครับ คุณ{}!\n\nส่งฉบับร่างของคุณมาได้เลยครับ ผมจะช่วยตรวจและให้คำแนะนำ\n\n(พิมพ์ข้อความที่ต้องการให้ตรวจ)",
        thai_name
    ))
}

pub fn feedback_report(feedback: &WritingFeedback) -> OutboundMessage {
    let suggestions = feedback
        .suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{}. {}", i + 1, s))
        .collect::<Vec<_>>()
        .join("\n");

    OutboundMessage::text(format!(
        "📝 ผลป้อนกลับจาก ProficienThAI\n\n{}\n\n{}\n\n💡 คำแนะนำ:\n{}\n\n{}\n\n{}",
        scores_block(feedback),
        feedback.feedback,
        suggestions,
        feedback.encouragement,
        points::format_points_message(points::REQUEST_FEEDBACK, "ขอผลป้อนกลับ")
    ))
}

// ════════════════════════════════════════════════════════════════════════════
// Submission
// ════════════════════════════════════════════════════════════════════════════

pub fn no_active_task() -> OutboundMessage {
    OutboundMessage::text("ขณะนี้ยังไม่มีภาระงานที่เปิดรับครับ กรุณารอประกาศจากอาจารย์")
}

pub fn task_brief(task: &Task) -> OutboundMessage {
    OutboundMessage::text(format!(
        "ภาระงานสัปดาห์ที่ {}\n\n{}\n\n{}\n\nอ่านเนื้อหา: {}\n\nความยาว: {}-{} คำ\nกำหนดส่ง: {}\n\nพิมพ์งานเขียนของคุณได้เลยครับ",
        task.week_number,
        task.title,
        task.description,
        task.content_url,
        task.min_words,
        task.max_words,
        task.deadline.format("%d/%m/%Y")
    ))
}

pub fn word_count_rejection(count: usize, min_words: i32) -> OutboundMessage {
    OutboundMessage::text(format!(
        "งานเขียนของคุณมี {} คำ\nกรุณาเขียนอย่างน้อย {} คำ\n\nพิมพ์งานใหม่ได้เลยครับ",
        count, min_words
    ))
}

pub fn submission_report(
    feedback: &WritingFeedback,
    timeliness: Timeliness,
    word_count: usize,
    points_earned: i64,
) -> OutboundMessage {
    OutboundMessage::text(format!(
        "✅ ส่งงานสำเร็จ!\n\n📌 สถานะ: {}\n📝 จำนวนคำ: {} คำ\n\n{}\n\n{}\n\n{}\n\n{}\n\n📅 ภาระงานถัดไปจะเริ่มในเวลา 00:00 น.",
        timeliness.label_thai(),
        word_count,
        scores_block(feedback),
        feedback.feedback,
        feedback.encouragement,
        points::format_points_message(points_earned, timeliness.label_thai())
    ))
}

// ════════════════════════════════════════════════════════════════════════════
// Games
// ════════════════════════════════════════════════════════════════════════════

pub fn game_menu() -> OutboundMessage {
    OutboundMessage::text(
        "🎮 เลือกเกมที่ต้องการเล่น:\n\n1️⃣ คำศัพท์จีน-ไทย - พิมพ์ \"คำศัพท์\"\n2️⃣ เติมคำในช่องว่าง - พิมพ์ \"เติมคำ\"\n3️⃣ เรียงคำเป็นประโยค - พิมพ์ \"เรียงคำ\"\n4️⃣ แต่งประโยคจากคำที่กำหนด - พิมพ์ \"แต่งประโยค\"\n\nเลือกเกมได้เลยครับ! 🎯",
    )
}

pub fn no_questions() -> OutboundMessage {
    OutboundMessage::text("ขออภัย ยังไม่มีคำถามในระบบ")
}

fn answer_instruction(kind: GameKind) -> &'static str {
    match kind {
        GameKind::Vocabulary => "พิมพ์คำตอบเลยครับ",
        GameKind::FillBlank => "พิมพ์คำที่ต้องใส่ในช่องว่าง",
        GameKind::WordOrder => "พิมพ์ประโยคที่เรียงแล้ว (ไม่ต้องใส่ตัวเลข)",
        GameKind::SentenceConstruction => "พิมพ์ประโยคที่แต่งเลยครับ",
    }
}

/// Renders the current question of a game in progress. The first question
/// carries the how-to-answer line; later ones do not.
pub fn game_question(play: &GamePlay) -> String {
    let header = format!(
        "{} {} (ข้อ {}/{})",
        play.kind.emoji(),
        play.kind.name_thai(),
        play.index + 1,
        play.total()
    );
    let body = play.current().prompt_body();
    if play.index == 0 {
        format!("{}\n\n{}\n\n{}", header, body, answer_instruction(play.kind))
    } else {
        format!("{}\n\n{}", header, body)
    }
}

pub fn first_game_question(play: &GamePlay) -> OutboundMessage {
    OutboundMessage::text(game_question(play))
}

fn answer_feedback(graded: &GradedAnswer) -> String {
    if graded.correct {
        format!("✅ ถูกต้อง! +{} คะแนน", points::GAME_CORRECT_ANSWER)
    } else {
        format!("❌ ไม่ถูกต้อง\nคำตอบคือ: {}", graded.correct_answer)
    }
}

/// Correctness feedback for the just-answered question plus the next one.
pub fn next_game_question(graded: &GradedAnswer, play: &GamePlay) -> OutboundMessage {
    OutboundMessage::text(format!("{}\n\n{}", answer_feedback(graded), game_question(play)))
}

/// Correctness feedback for the last answer plus the end-of-game summary.
pub fn game_finished(graded: &GradedAnswer, kind: GameKind, summary: &GameSummary) -> OutboundMessage {
    OutboundMessage::text(format!(
        "{}\n\n{} จบเกมแล้ว! {}\n\n📊 ผลคะแนน:\n✅ ถูก: {}/{} ข้อ\n📈 ได้คะแนน: +{} แต้ม\n🎯 อัตราถูก: {}%\n\nพิมพ์ \"เกม\" เพื่อเล่นเกมอื่นๆ หรือ \"{}\" เพื่อเล่นใหม่",
        answer_feedback(graded),
        summary.tier.emoji(),
        summary.tier.phrase_thai(),
        summary.correct_count,
        summary.total,
        summary.points_earned,
        summary.percentage,
        kind.replay_keyword()
    ))
}

// ════════════════════════════════════════════════════════════════════════════
// Practice
// ════════════════════════════════════════════════════════════════════════════

pub fn no_practice_content() -> OutboundMessage {
    OutboundMessage::text("ขณะนี้ยังไม่มีแบบฝึกหัดครับ กรุณารอการอัปเดต")
}

pub fn practice_card(card: &VocabularyCard) -> OutboundMessage {
    let example = card
        .example_sentence
        .as_deref()
        .map(|s| format!("\n\nตัวอย่าง: {}", s))
        .unwrap_or_default();

    OutboundMessage::quick_reply(
        format!(
            "ฝึกคำศัพท์\n\nคำว่า \"{}\" หมายความว่าอะไร?{}",
            card.word, example
        ),
        vec![
            QuickReplyOption::new("ดูคำตอบ", format!("คำตอบ:{}", card.meaning)),
            QuickReplyOption::new("ข้อถัดไป", "ฝึกฝน"),
            QuickReplyOption::new("กลับเมนู", "แดชบอร์ด"),
        ],
    )
}

// ════════════════════════════════════════════════════════════════════════════
// Badges
// ════════════════════════════════════════════════════════════════════════════

pub fn badge_earned(spec: &BadgeSpec) -> OutboundMessage {
    OutboundMessage::text(format!(
        "🏅 ได้รับเหรียญตราใหม่: {} ({})\n\n{}",
        spec.name_thai, spec.name, spec.description
    ))
}

// ════════════════════════════════════════════════════════════════════════════
// Dashboard & profile flex bubbles
// ════════════════════════════════════════════════════════════════════════════

/// Inputs for the dashboard bubble.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub thai_name: String,
    pub level: i32,
    pub points: i64,
    pub progress_percent: i32,
    pub next_level_points: i64,
    pub submission_count: i64,
    pub total_tasks: i64,
}

pub fn dashboard_flex(view: &DashboardView) -> OutboundMessage {
    let contents = json!({
        "type": "bubble",
        "size": "mega",
        "header": {
            "type": "box",
            "layout": "vertical",
            "contents": [
                { "type": "text", "text": "Dashboard", "weight": "bold", "size": "xl", "color": "#1DB446" },
                { "type": "text", "text": view.thai_name, "size": "sm", "color": "#666666" }
            ],
            "paddingAll": "20px",
            "backgroundColor": "#F5F5F5"
        },
        "body": {
            "type": "box",
            "layout": "vertical",
            "contents": [
                {
                    "type": "box",
                    "layout": "horizontal",
                    "contents": [
                        { "type": "text", "text": format!("Level {}", view.level), "weight": "bold", "size": "xxl", "flex": 0 },
                        { "type": "text", "text": format!("{} pts", view.points), "size": "sm", "color": "#999999", "align": "end", "gravity": "bottom" }
                    ]
                },
                { "type": "text", "text": format!("Progress: {}%", view.progress_percent), "size": "xs", "color": "#999999", "margin": "lg" },
                { "type": "text", "text": format!("{} points to Level {}", view.next_level_points - view.points, view.level + 1), "size": "xs", "color": "#999999", "margin": "sm" },
                { "type": "separator", "margin": "xl" },
                {
                    "type": "box",
                    "layout": "horizontal",
                    "margin": "xl",
                    "contents": [
                        {
                            "type": "box",
                            "layout": "vertical",
                            "flex": 1,
                            "contents": [
                                { "type": "text", "text": format!("{}/{}", view.submission_count, view.total_tasks), "size": "xl", "weight": "bold", "align": "center" },
                                { "type": "text", "text": "Tasks Done", "size": "xs", "color": "#999999", "align": "center" }
                            ]
                        },
                        {
                            "type": "box",
                            "layout": "vertical",
                            "flex": 1,
                            "contents": [
                                { "type": "text", "text": format!("{}", view.points), "size": "xl", "weight": "bold", "align": "center" },
                                { "type": "text", "text": "Points", "size": "xs", "color": "#999999", "align": "center" }
                            ]
                        }
                    ]
                }
            ],
            "paddingAll": "20px"
        }
    });

    OutboundMessage::flex(format!("Dashboard - Level {}", view.level), contents)
}

fn profile_row(label: &str, value: &str) -> serde_json::Value {
    json!({
        "type": "box",
        "layout": "horizontal",
        "contents": [
            { "type": "text", "text": label, "size": "sm", "color": "#999999", "flex": 2 },
            { "type": "text", "text": if value.is_empty() { "-" } else { value }, "size": "sm", "weight": "bold", "flex": 3, "wrap": true }
        ]
    })
}

pub fn profile_flex(user: &User) -> OutboundMessage {
    let contents = json!({
        "type": "bubble",
        "size": "mega",
        "header": {
            "type": "box",
            "layout": "vertical",
            "contents": [
                { "type": "text", "text": "My Profile", "weight": "bold", "size": "xl", "color": "#5B5BFF" }
            ],
            "paddingAll": "20px",
            "backgroundColor": "#F0F0FF"
        },
        "body": {
            "type": "box",
            "layout": "vertical",
            "spacing": "md",
            "paddingAll": "20px",
            "contents": [
                profile_row("Name", user.chinese_name.as_deref().unwrap_or("-")),
                profile_row("Thai Name", user.thai_name.as_deref().unwrap_or("-")),
                profile_row("University", user.university.as_deref().unwrap_or("-")),
                profile_row("Email", user.email.as_deref().unwrap_or("-")),
                profile_row("Nationality", user.nationality.as_deref().unwrap_or("-")),
                profile_row("Thai Level", user.thai_level.as_str())
            ]
        }
    });

    OutboundMessage::flex("My Profile", contents)
}

/// Welcome bubble sent on a follow event.
pub fn welcome_flex() -> OutboundMessage {
    let contents = json!({
        "type": "bubble",
        "size": "mega",
        "header": {
            "type": "box",
            "layout": "vertical",
            "contents": [
                { "type": "text", "text": "ProficienThAI", "weight": "bold", "size": "xl", "color": "#1DB446" },
                { "type": "text", "text": "ผู้ช่วยฝึกเขียนภาษาไทย", "size": "sm", "color": "#666666" }
            ],
            "paddingAll": "20px",
            "backgroundColor": "#F5F5F5"
        },
        "body": {
            "type": "box",
            "layout": "vertical",
            "contents": [
                { "type": "text", "wrap": true, "text": "ยินดีต้อนรับครับ! 🎉\n\nผมจะช่วยคุณฝึกอ่านเขียนภาษาไทย ส่งงาน ขอผลป้อนกลับ และเล่นเกมคำศัพท์\n\n欢迎！我会帮助你练习泰语读写。" }
            ],
            "paddingAll": "20px"
        },
        "footer": {
            "type": "box",
            "layout": "vertical",
            "contents": [
                {
                    "type": "button",
                    "style": "primary",
                    "color": "#1DB446",
                    "action": { "type": "postback", "label": "ลงทะเบียน / Register", "data": "action=register" }
                }
            ],
            "paddingAll": "20px"
        }
    });

    OutboundMessage::flex("Welcome to ProficienThAI", contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::games::{GameQuestion, ResultTier};
    use crate::domain::foundation::QuestionId;

    fn play_of(n: usize) -> GamePlay {
        let questions = (0..n)
            .map(|i| GameQuestion::Vocabulary {
                id: QuestionId::new(),
                chinese_word: format!("字{}", i),
                thai_meaning: format!("คำ{}", i),
            })
            .collect();
        GamePlay::new(GameKind::Vocabulary, questions).unwrap()
    }

    #[test]
    fn first_question_carries_instruction() {
        let play = play_of(5);
        let text = game_question(&play);
        assert!(text.contains("(ข้อ 1/5)"));
        assert!(text.contains("พิมพ์คำตอบเลยครับ"));
    }

    #[test]
    fn later_questions_omit_instruction() {
        let mut play = play_of(5);
        play.answer("ผิด");
        let text = game_question(&play);
        assert!(text.contains("(ข้อ 2/5)"));
        assert!(!text.contains("พิมพ์คำตอบเลยครับ"));
    }

    #[test]
    fn game_summary_shows_band_and_points() {
        let graded = GradedAnswer { correct: true, correct_answer: "คำ".to_string() };
        let summary = GameSummary {
            correct_count: 3,
            total: 5,
            points_earned: 30,
            percentage: 60,
            tier: ResultTier::Good,
        };
        let msg = game_finished(&graded, GameKind::Vocabulary, &summary);
        match msg {
            OutboundMessage::Text(text) => {
                assert!(text.contains("3/5"));
                assert!(text.contains("+30 แต้ม"));
                assert!(text.contains("60%"));
                assert!(text.contains("👍"));
            }
            _ => panic!("expected text"),
        }
    }

    #[test]
    fn feedback_report_numbers_suggestions() {
        let msg = feedback_report(&WritingFeedback::fallback());
        match msg {
            OutboundMessage::Text(text) => {
                assert!(text.contains("รวม: 10/20"));
                assert!(text.contains("1. "));
                assert!(text.contains("3. "));
                assert!(text.contains("+5 แต้ม"));
            }
            _ => panic!("expected text"),
        }
    }

    #[test]
    fn practice_card_offers_reveal_and_next() {
        let card = VocabularyCard {
            word: "朋友".to_string(),
            meaning: "เพื่อน".to_string(),
            example_sentence: None,
        };
        match practice_card(&card) {
            OutboundMessage::TextWithQuickReply { options, .. } => {
                assert_eq!(options.len(), 3);
                assert_eq!(options[0].text, "คำตอบ:เพื่อน");
            }
            _ => panic!("expected quick reply"),
        }
    }
}
