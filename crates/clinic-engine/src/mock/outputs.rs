use clinic_types::{
    DigitalDoctorReasoning, EmptyOutput, EvidenceConclusion, EvidenceFile, FileRef, ItemList,
    MedicalRecord, PersonalizedAnalysis, ReasoningItem, ToolName, ToolOutput,
};

const FILE_BASE_URL: &str = "https://example.com/files";

pub fn for_tool(tool: ToolName) -> ToolOutput {
    match tool {
        ToolName::DigitalDoctorReasoning => ToolOutput::DigitalDoctorReasoning(digital_doctor_reasoning()),
        ToolName::EvidenceConclusion => ToolOutput::EvidenceConclusion(evidence_conclusion()),
        ToolName::PersonalizedAnalysis => ToolOutput::PersonalizedAnalysis(personalized_analysis()),
        ToolName::IntegratedReasoning => ToolOutput::Empty(EmptyOutput::default()),
    }
}

fn item(name: &str, files: &[(&str, &str)]) -> ReasoningItem {
    ReasoningItem {
        item: name.to_string(),
        file_list: files
            .iter()
            .map(|(file_name, file_id)| FileRef {
                file_name: file_name.to_string(),
                file_id: file_id.to_string(),
            })
            .collect(),
    }
}

fn digital_doctor_reasoning() -> DigitalDoctorReasoning {
    DigitalDoctorReasoning {
        diagnosis: ItemList {
            list: vec![
                item(
                    "疑似肺炎",
                    &[("CT_scan_001.jpg", "file_12345"), ("X_ray_chest_001.jpg", "file_12346")],
                ),
                item("支气管炎可能性", &[("bronchoscopy_report.pdf", "file_12347")]),
                item("上呼吸道感染", &[]),
            ],
        },
        exams: ItemList {
            list: vec![
                item("血常规检查", &[("blood_test.pdf", "file_67890")]),
                item("C反应蛋白检查", &[("crp_test.pdf", "file_67891")]),
                item("胸部CT检查", &[("CT_scan_001.jpg", "file_12345")]),
                item("痰培养检查", &[("sputum_culture.pdf", "file_67892")]),
            ],
        },
        treatments: ItemList {
            list: vec![
                item("抗生素治疗", &[("prescription.pdf", "file_11111")]),
                item("对症支持治疗", &[("supportive_care.pdf", "file_11112")]),
                item("雾化吸入治疗", &[("nebulization_guide.pdf", "file_11113")]),
            ],
        },
    }
}

fn evidence_conclusion() -> EvidenceConclusion {
    const FILES: [(&str, &str, &str); 7] = [
        ("CT_scan_001.jpg", "file_12345", "image/jpeg"),
        ("X_ray_chest_001.jpg", "file_12346", "image/jpeg"),
        ("blood_test.pdf", "file_67890", "application/pdf"),
        ("crp_test.pdf", "file_67891", "application/pdf"),
        ("sputum_culture.pdf", "file_67892", "application/pdf"),
        ("prescription.pdf", "file_11111", "application/pdf"),
        ("medical_report.pdf", "file_11114", "application/pdf"),
    ];

    EvidenceConclusion {
        evidence_list: FILES
            .iter()
            .map(|(file_name, file_id, file_type)| EvidenceFile {
                file_name: file_name.to_string(),
                file_id: file_id.to_string(),
                file_url: Some(format!("{}/{}", FILE_BASE_URL, file_name)),
                file_type: Some(file_type.to_string()),
            })
            .collect(),
    }
}

fn personalized_analysis() -> PersonalizedAnalysis {
    const RECORDS: [(&str, &str, &str); 7] = [
        (
            "record_001",
            "2024-01-15T10:30:00Z",
            "患者主诉：胸痛3天，伴有咳嗽，无发热，无呼吸困难。疼痛性质为钝痛，活动后加重。",
        ),
        (
            "record_002",
            "2024-01-10T14:20:00Z",
            "既往病史：高血压病史5年，规律服用降压药物，血压控制良好。无糖尿病、心脏病等慢性疾病史。",
        ),
        (
            "record_003",
            "2024-01-08T09:15:00Z",
            "体格检查：体温36.5℃，血压130/80mmHg，心率78次/分，呼吸18次/分。双肺呼吸音清，未闻及干湿性啰音。",
        ),
        (
            "record_004",
            "2024-01-05T11:00:00Z",
            "辅助检查：血常规示白细胞计数正常，中性粒细胞比例略高。胸部CT示双肺纹理增粗，未见明显实变影。",
        ),
        (
            "record_005",
            "2024-01-03T16:45:00Z",
            "诊断：上呼吸道感染，支气管炎可能性大。建议抗感染治疗，对症支持治疗，注意休息，多饮水。",
        ),
        (
            "record_006",
            "2023-12-28T10:20:00Z",
            "用药记录：阿莫西林胶囊0.5g，每日3次，口服；布洛芬缓释胶囊0.3g，每日2次，口服。",
        ),
        (
            "record_007",
            "2023-12-25T14:30:00Z",
            "随访记录：患者症状较前好转，咳嗽减轻，胸痛缓解。建议继续当前治疗方案，1周后复查。",
        ),
    ];

    PersonalizedAnalysis {
        record_list: RECORDS
            .iter()
            .map(|(record_id, record_time, record_content)| MedicalRecord {
                record_id: record_id.to_string(),
                record_time: record_time.to_string(),
                record_content: record_content.to_string(),
            })
            .collect(),
    }
}
