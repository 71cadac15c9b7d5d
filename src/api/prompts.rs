//! Prompt text sent to the generative model.

use crate::model::{Amount, Category};

/// Keywords appended to every image prompt so that generated images share one look.
const IMAGE_STYLE_KEYWORDS: &str = "3D render, cute chibi character, Pixar style, high quality, \
soft studio lighting, intense weather atmosphere, immersive environment, particle effects, rain \
drops or sun rays visible, cinematic composition";

/// Asks for a grounded weather report for `location` as a JSON object in a code block.
pub(super) fn weather(location: &str) -> String {
    format!(
        r#"Find the current weather report for {location}.
Search for the current temperature, today's low/high temperature, and weather condition.
Also, search for a specific URL of a trending or interesting news article on Naver News (news.naver.com).

Based on the search results, generate a JSON object with the following fields:
- location: (string) "{location}"
- currentTemp: (number) Current temperature in Celsius.
- lowTemp: (number) Today's low temperature.
- highTemp: (number) Today's high temperature.
- condition: (string) Short weather condition in English (e.g., Rain, Sunny, Cloudy, Snow).
- comment: (string) A friendly, helpful one-line weather advice in Korean (e.g., '비가 오니 우산을 챙기세요').
- imagePrompt: (string) A description of a character experiencing this weather. IMPORTANT: The weather must be the MOST DOMINANT visual feature. If rain, describe heavy rain pouring, wet surfaces, and splashes. If sunny, describe blinding sun rays and clear blue skies. If cloudy, describe dramatic thick clouds filling the sky. The character should be interacting with this intense weather.
- newsLink: (string) The specific URL of the trending Naver News article found.

Output ONLY the JSON string inside a code block."#
    )
}

/// Wraps a scene description with the fixed style preamble and keywords.
pub(super) fn image(prompt: &str) -> String {
    format!(
        "An image where the weather condition is the main focus. {}. {IMAGE_STYLE_KEYWORDS}",
        prompt.trim().trim_end_matches('.')
    )
}

/// Asks for a short, witty comment in Korean about a day's spending.
pub(super) fn spending_comment(total: Amount, categories: &[Category]) -> String {
    let categories = categories
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"You are a witty, slightly sarcastic, but helpful financial assistant.
Analyze today's spending.
Total Amount: {total} KRW
Categories: {categories}

Write a ONE-LINE comment in Korean about this spending.
- If the amount is high (> 50,000 KRW), be sarcastic or warning (e.g., "Are you rich?", "Wallet is crying").
- If the amount is low or zero, be encouraging.
- If mostly food, mention diet or hunger.
- Keep it under 30 characters.
- Do NOT use markdown. Just the text."#,
        total = total.value(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_prompt_names_location() {
        let prompt = weather("Busan, South Korea (부산)");
        assert!(prompt.contains("weather report for Busan, South Korea (부산)."));
        assert!(prompt.contains("newsLink"));
        assert!(prompt.contains("inside a code block"));
    }

    #[test]
    fn test_image_prompt_is_wrapped() {
        let prompt = image("A cat in heavy rain. ");
        assert_eq!(
            prompt,
            format!(
                "An image where the weather condition is the main focus. A cat in heavy rain. \
                {IMAGE_STYLE_KEYWORDS}"
            )
        );
    }

    #[test]
    fn test_spending_comment_prompt() {
        let total = Amount::new(60000).unwrap();
        let prompt = spending_comment(total, &[Category::Shopping, Category::Food]);
        assert!(prompt.contains("Total Amount: 60000 KRW"));
        assert!(prompt.contains("Categories: shopping, food"));
    }
}
