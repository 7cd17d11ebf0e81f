use crate::api::Provider;
use crate::config::FailurePolicy;
use crate::{loge, logi};

pub const IMAGE_PROMPT_SYSTEM_PROMPT: &str = "You are a helpful assistant who is able to generate perfect DallE 3 image generation prompts. Those prompts should be perfect for generating images to accompany the spoken text in a video. Please only output the prompt for the text the user is providing. Please do not include any further instructions or explainations in your answer, only the prompt text.";
pub const IMAGE_PROMPT_TEMPERATURE: f64 = 1.4;

/// Issues `count` independent completion requests, one per image.
///
/// Results keep request order. With [`FailurePolicy::Abort`] the first failure
/// ends the loop and the prompts gathered so far are returned; with
/// [`FailurePolicy::Continue`] failed requests are simply left out. An empty
/// completion counts as a failure.
pub async fn generate_image_prompts(
    provider: &dyn Provider,
    text: &str,
    count: usize,
    policy: FailurePolicy,
) -> Vec<String> {
    let mut prompts = Vec::with_capacity(count);

    for i in 1..=count {
        logi(format!("Requesting image prompt {}/{}", i, count));
        match provider
            .chat(IMAGE_PROMPT_SYSTEM_PROMPT, text, Some(IMAGE_PROMPT_TEMPERATURE))
            .await
        {
            Ok(prompt) if !prompt.trim().is_empty() => prompts.push(prompt.trim().to_string()),
            Ok(_) => {
                loge("Error while generating image prompts with OpenAI: empty completion");
                if policy == FailurePolicy::Abort {
                    break;
                }
            }
            Err(err) => {
                loge(format!(
                    "Error while generating image prompts with OpenAI: {}",
                    err
                ));
                if policy == FailurePolicy::Abort {
                    break;
                }
            }
        }
    }

    prompts
}
