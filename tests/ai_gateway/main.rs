mod gemini;
