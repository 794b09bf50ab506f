use crate::entries::repo::DailySummary;

const CALORIE_TARGET: f64 = 2000.0;

/// Rule-based fitness advice: eight fixed keyword categories checked in
/// priority order, first match wins, case-insensitive substring matching.
/// Pure function over the message and the day's summary.
pub fn advise(message: &str, summary: &DailySummary) -> String {
    let lower = message.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if has(&["protein", "muscle", "strength"]) {
        format!(
            "💪 Protein is essential for muscle growth! Today you've consumed {:.1}g protein. \
             Aim for 1.6-2.2g per kg of body weight. Sources: chicken, fish, eggs, legumes, Greek yogurt.",
            summary.protein
        )
    } else if has(&["weight loss", "diet", "calorie", "lose weight"]) {
        format!(
            "🔥 For weight loss, maintain a calorie deficit. Today: {:.0}/{:.0} calories. \
             {:.0} remaining. Focus on high-protein, high-fiber foods to stay full.",
            summary.calories,
            CALORIE_TARGET,
            CALORIE_TARGET - summary.calories
        )
    } else if has(&["carb", "energy", "stamina"]) {
        format!(
            "⚡ Carbs fuel your workouts! Today: {:.1}g carbs. Aim for 5-7g/kg for moderate \
             activity, 7-10g/kg for intense training. Choose complex carbs: oats, brown rice, sweet potatoes.",
            summary.carbs
        )
    } else if has(&["fat", "healthy fat", "omega"]) {
        format!(
            "🧈 Healthy fats support hormones and heart health. Today: {:.1}g fat. Aim for \
             20-35% of calories. Sources: avocado, nuts, olive oil, fatty fish.",
            summary.fat
        )
    } else if has(&["water", "hydration", "drink"]) {
        "💧 Hydration is key! Drink at least 8-10 glasses (2-3L) of water daily. More if you \
         exercise. Check urine color—pale yellow is ideal."
            .to_string()
    } else if has(&["workout", "exercise", "gym", "training"]) {
        "🏋️ Exercise regularly: 150 min moderate or 75 min vigorous cardio + 2 days strength \
         training weekly. Mix cardio, strength, and flexibility for best results."
            .to_string()
    } else if has(&["sleep", "rest", "recovery"]) {
        "😴 Sleep is crucial! Aim for 7-9 hours nightly. Quality sleep aids recovery, \
         metabolism, and mood. Keep your bedroom cool and dark."
            .to_string()
    } else if has(&["goal", "track", "how do i"]) {
        format!(
            "🎯 Your today's stats: {:.0} cal | {:.1}g protein | {:.1}g carbs | {:.1}g fat. \
             Keep logging to track trends and reach your goals!",
            summary.calories, summary.protein, summary.carbs, summary.fat
        )
    } else {
        "🤔 Great question! I can help with nutrition, macros, fitness tips, hydration, sleep, \
         and workout advice. What would you like to know?"
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> DailySummary {
        DailySummary {
            calories: 1450.0,
            protein: 45.0,
            carbs: 160.5,
            fat: 38.2,
        }
    }

    #[test]
    fn protein_question_interpolates_daily_protein() {
        let reply = advise("how much protein did I eat", &summary());
        assert!(reply.contains("45.0g protein"));
    }

    #[test]
    fn calorie_question_reports_remaining_budget() {
        let reply = advise("am I over my CALORIE budget?", &summary());
        assert!(reply.contains("1450/2000 calories"));
        assert!(reply.contains("550 remaining"));
    }

    #[test]
    fn priority_order_is_fixed_protein_before_calories() {
        // Both categories match; protein is checked first.
        let reply = advise("protein and calorie advice please", &summary());
        assert!(reply.contains("protein"));
        assert!(reply.starts_with("💪"));
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        let reply = advise("Tell me about HYDRATION", &summary());
        assert!(reply.starts_with("💧"));
    }

    #[test]
    fn goal_tracking_lists_all_four_macros() {
        let reply = advise("help me track my goal", &summary());
        assert!(reply.contains("1450 cal"));
        assert!(reply.contains("45.0g protein"));
        assert!(reply.contains("160.5g carbs"));
        assert!(reply.contains("38.2g fat"));
    }

    #[test]
    fn unmatched_message_gets_generic_prompt() {
        let reply = advise("what's the weather like", &summary());
        assert!(reply.starts_with("🤔"));
    }

    #[test]
    fn empty_summary_still_answers() {
        let reply = advise("calorie check", &DailySummary::ZERO);
        assert!(reply.contains("0/2000 calories"));
        assert!(reply.contains("2000 remaining"));
    }
}
