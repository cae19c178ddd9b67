//! Prompt rendering for remark generation.

use std::fmt::Write;

use crate::model::{AchievementStandard, Guidelines, SentenceCounts, Tier};

/// Principle used when the guidelines document has no `5. 정리` entry.
pub const DEFAULT_SUMMARY: &str =
    "학생의 학습 과정과 변화를 기록하는 ‘관찰 기반 서술형 기록’입니다.";

const PERSONA: &str = "당신은 20년 경력의 대한민국 초등학교 담임교사입니다.";

const WRITING_RULES: [&str; 5] = [
    "**문장 형식 (가장 중요):** 모든 문장은 학생의 이름 없이 학생의 행동을 서술하는 형식으로 끝나야 합니다. 문장의 어미는 반드시 '~함.', '~임.', '~음.', '~관찰됨.', '~보여줌.'과 같은 서술형으로 끝나야 합니다.",
    "**학생 주어 제거:** 'OO 학생은' 또는 'OO는'과 같은 학생 주어를 절대 포함하지 마세요. 순수한 서술부만 생성해야 합니다.",
    "**객관성과 구체성:** '잘함', '우수함' 같은 주관적인 판단 대신, 학생이 무엇을 어떻게 했는지 관찰된 사실을 기반으로 서술하세요.",
    "**과정과 성장:** 결과뿐만 아니라 학생의 학습 과정, 태도의 변화, 노력, 성장의 모습이 드러나도록 작성하세요.",
    "**성취기준 연계:** 제시된 [성취기준 정보]와 밀접하게 관련된 내용으로 작성하세요.",
];

/// Render the instruction sent to the provider.
///
/// The output depends only on the arguments: examples are emitted in key
/// order and tiers always in 상, 중, 하 order.
pub fn build_prompt(
    guidelines: &Guidelines,
    standard: &AchievementStandard,
    counts: SentenceCounts,
) -> String {
    let summary = guidelines.summary.as_deref().unwrap_or(DEFAULT_SUMMARY);
    let mut prompt = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(
        prompt,
        "{PERSONA} 학생의 교과학습발달상황(세부능력 및 특기사항)을 '{summary}' 원칙에 따라 작성해야 합니다."
    );

    prompt.push_str("\n**[매우 중요한 작성 원칙]**\n");
    for (i, rule) in WRITING_RULES.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {rule}", i + 1);
    }

    prompt.push_str("\n**[좋은 작성 예시]**\n");
    for (subject, example) in &guidelines.examples {
        let text = match example {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let _ = writeln!(prompt, "- {subject} 예시: \"{text}\"");
    }

    prompt.push_str("\n**[성취기준 정보]**\n");
    let _ = writeln!(prompt, "- 성취기준: {}", standard.standard);
    for tier in Tier::ALL {
        let _ = writeln!(prompt, "- 성취수준({tier}): {}", standard.levels.get(tier));
    }

    prompt.push_str("\n**[생성 요청]**\n");
    for tier in Tier::ALL {
        let _ = writeln!(prompt, "- '{tier}' 수준 문장: {}개", counts.get(tier));
    }

    prompt.push_str(
        "\n이제 위의 모든 지침과 예시를 철저히 따라서, 요청된 개수만큼 교과 평어 문장을 JSON 형식으로 생성해주세요.\n",
    );
    prompt.push_str("{\n  \"상\": [\"문장 1\", ...],\n  \"중\": [\"문장 1\", ...],\n  \"하\": [\"문장 1\", ...]\n}\n");

    prompt
}
