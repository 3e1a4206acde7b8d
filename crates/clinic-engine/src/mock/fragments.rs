use clinic_types::Session;

/// Reasoning trace for a request. Only request fields feed into it.
pub fn thinking(session: &Session) -> Vec<String> {
    let role = session.user_role();

    vec![
        "首先，我需要分析用户的输入内容。".to_string(),
        format!("用户说：\"{}\"。", session.user_input()),
        format!(
            "用户处于{}模式，意味着用户是{}。",
            role.as_str().to_uppercase(),
            role.label()
        ),
        format!(
            "根据业务场景 {}，我需要采用相应的处理策略。",
            session.business_scenario()
        ),
        format!(
            "当前使用的模型ID是 {}，提示词ID是 {}。",
            session.model_id(),
            session.prompt_id()
        ),
        "让我先理解用户的核心诉求和问题背景。".to_string(),
        "用户可能面临的问题包括：症状描述不清晰、需要专业建议、或者需要辅助诊断。".to_string(),
        "我需要结合医疗知识库和临床经验来提供准确的回答。".to_string(),
        format!(
            "考虑到用户的角色是{}，回答的深度和专业程度需要适当调整。",
            role.label()
        ),
        "现在开始生成回答内容，确保信息准确、易懂且具有指导意义。".to_string(),
    ]
}

/// Markdown advice, split the way it is streamed.
pub const CONTENT: &[&str] = &[
    "感谢您的咨询。",
    "根据您提供的信息，我将为您进行详细的分析和建议。",
    "\n\n",
    "**一、问题分析**\n\n",
    "您提到的问题需要从多个角度进行考虑。",
    "首先，我们需要明确症状的具体表现、持续时间以及可能的诱因。",
    "其次，需要了解您的既往病史、用药情况以及家族病史等相关信息。",
    "最后，结合您的年龄、性别、生活习惯等因素进行综合判断。",
    "\n\n",
    "**二、专业建议**\n\n",
    "基于您的情况，我建议您：",
    "\n1. ",
    "及时就医，进行专业的医学检查。",
    "建议您前往正规医院的相关科室（如内科、外科、专科门诊等）进行详细检查。",
    "\n2. ",
    "完善相关检查项目。",
    "根据您的症状，可能需要进行血常规、尿常规、影像学检查（如X光、CT、MRI等）等检查。",
    "这些检查有助于明确诊断，为后续治疗提供依据。",
    "\n3. ",
    "注意观察症状变化。",
    "在就医前，请密切观察症状的变化情况，包括：",
    "症状的严重程度、发作频率、持续时间、是否有加重或缓解的趋势等。",
    "这些信息对医生的诊断非常有帮助。",
    "\n4. ",
    "保持良好的生活习惯。",
    "在治疗期间，建议您：",
    "保持充足的睡眠，避免熬夜；",
    "饮食清淡，避免辛辣刺激食物；",
    "适当运动，但避免剧烈运动；",
    "保持心情愉悦，避免过度焦虑。",
    "\n\n",
    "**三、注意事项**\n\n",
    "在等待就医或治疗期间，请注意以下几点：",
    "\n- ",
    "不要自行用药，尤其是处方药，应在医生指导下使用。",
    "\n- ",
    "如果症状突然加重或出现新的症状，应立即就医。",
    "\n- ",
    "保持与医生的良好沟通，及时反馈治疗效果和身体反应。",
    "\n- ",
    "定期复查，按照医生的建议进行随访。",
    "\n\n",
    "**四、后续建议**\n\n",
    "建议您建立健康档案，记录症状变化、检查结果、用药情况等信息。",
    "这将有助于医生更好地了解您的病情，制定个性化的治疗方案。",
    "同时，建议您关注相关的健康知识，提高自我保健意识。",
    "\n\n",
    "希望以上信息对您有所帮助。",
    "如果您还有其他问题或需要进一步咨询，请随时告诉我。",
    "祝您早日康复！",
];

pub fn content() -> Vec<String> {
    CONTENT.iter().map(|part| part.to_string()).collect()
}
