use crate::models::domain::Language;

pub fn default_quiz_title(language: Language) -> &'static str {
    match language {
        Language::En => "AI Generated Quiz",
        Language::Vi => "Bài trắc nghiệm AI",
    }
}

pub fn generation_start(language: Language) -> &'static str {
    match language {
        Language::En => "Analyzing text and preparing first batch...",
        Language::Vi => "Đang phân tích văn bản và chuẩn bị đợt đầu tiên...",
    }
}

/// Shown while the questions `first..=last` are being generated.
pub fn generating_range(language: Language, first: usize, last: usize) -> String {
    match language {
        Language::En => format!("Generating questions {} to {}...", first, last),
        Language::Vi => format!("Đang tạo câu hỏi từ {} đến {}...", first, last),
    }
}

pub fn batch_done(language: Language, current: usize, total: usize) -> String {
    match language {
        Language::En => format!("Batch {} of {}", current, total),
        Language::Vi => format!("Đợt {} trên {}", current, total),
    }
}

pub fn generation_failed(language: Language) -> &'static str {
    match language {
        Language::En => "Failed to generate quiz batch.",
        Language::Vi => {
            "Không thể tạo câu hỏi. Nội dung có thể quá ngắn hoặc gặp lỗi kết nối."
        }
    }
}

pub fn merged_title(language: Language, names: &str) -> String {
    match language {
        Language::En => format!("Merged: {}", names),
        Language::Vi => format!("Gộp: {}", names),
    }
}

pub fn invalid_quiz_file(language: Language) -> &'static str {
    match language {
        Language::En => "Invalid quiz file format.",
        Language::Vi => "Định dạng file không hợp lệ.",
    }
}

pub fn not_enough_content(language: Language) -> &'static str {
    match language {
        Language::En => "Please provide content or upload files.",
        Language::Vi => "Vui lòng nhập nội dung hoặc tải file.",
    }
}
